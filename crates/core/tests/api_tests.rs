//! Library API integration tests
use peloton_core::*;
use std::collections::HashMap;
use std::time::Duration;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn load(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

fn parse_fixture(name: &str) -> Document {
    Document::parse(&load(name)).expect("should parse")
}

/// Serves saved pages keyed by URL; unknown URLs fail like a dropped connection.
struct SavedPages {
    pages: HashMap<String, String>,
}

impl SavedPages {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self { pages: pages.iter().map(|(url, name)| (url.to_string(), load(name))).collect() }
    }
}

impl PageFetcher for SavedPages {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.pages.get(url).cloned().ok_or(PelotonError::Timeout { timeout: 30 })
    }
}

const OVERVIEW: &str = "https://www.procyclingstats.com/race/tour-de-france/2020/stages";
const STAGE_1: &str = "https://www.procyclingstats.com/race/tour-de-france/2020/stage-1";
const STAGE_2: &str = "https://www.procyclingstats.com/race/tour-de-france/2020/stage-2";
const STAGE_3: &str = "https://www.procyclingstats.com/race/tour-de-france/2020/stage-3";
const RIDER: &str = "https://www.procyclingstats.com/rider/tadej-pogacar";

#[test]
fn test_stage_list_keeps_rest_day_in_position() {
    let stages = stage_list(&parse_fixture("stage_overview.html")).unwrap();

    assert_eq!(stages.len(), 4);
    assert!(stages[2].is_rest_day());
    assert_eq!(stages[2].stage_name(), REST_DAY);

    let first = stages[0].as_stage().unwrap();
    assert_eq!(first.date, "29/08");
    assert_eq!(first.stage_name, "Stage 1");
    assert_eq!(first.profile.as_deref(), Some("p2"));
    assert_eq!(first.distance_km, 156.0);
    assert_eq!(first.url, STAGE_1);

    let last = stages[3].as_stage().unwrap();
    assert_eq!(last.start_location, "Nice");
    assert_eq!(last.end_location, "Sisteron");
}

#[test]
fn test_stage_list_json_output() {
    let stages = stage_list(&parse_fixture("stage_overview.html")).unwrap();
    let json = serde_json::to_value(&stages).unwrap();

    assert_eq!(json[2]["stage_name"], "REST DAY");
    assert!(json[2]["distance_km"].is_null());
    assert_eq!(json[1]["distance_km"], 186.0);
}

#[test]
fn test_stage_results() {
    let table = stage_results(&parse_fixture("stage_results.html")).unwrap();
    let rows = table.rows().expect("results table present");

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].rider, "KRISTOFF Alexander");
    assert_eq!(rows[0].team, "UAE-Team Emirates");
    assert_eq!(rows[0].nationality.as_deref(), Some("no"));
    assert_eq!(rows[0].time, Some(Duration::from_secs(3 * 3600 + 46 * 60 + 23)));
    assert_eq!(rows[0].gc_gap, None);

    assert_eq!(rows[1].gc_gap, Some(Duration::from_secs(4)));
    assert_eq!(rows[1].time, Some(Duration::ZERO));

    assert_eq!(rows[2].stage_position, None);
    assert_eq!(rows[2].gc_position, None);
    assert_eq!(rows[2].pcs_points, 0);
    assert_eq!(rows[2].time, None);
}

#[test]
fn test_stage_results_without_table_is_no_data() {
    let table = stage_results(&parse_fixture("stage_no_results.html")).unwrap();
    assert!(table.is_no_data());
}

#[test]
fn test_one_day_results() {
    let rows = one_day_results(&parse_fixture("one_day_results.html")).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].position, Some(1));
    assert_eq!(rows[0].rider, "ROGLIČ Primož");
    assert_eq!(rows[1].uci_points, 400);
    assert_eq!(rows[2].position, None);
    assert_eq!(rows[2].rider, "RIDER Some");
    assert_eq!(rows[2].time, None);
}

#[test]
fn test_race_calendar() {
    let races = race_calendar(&parse_fixture("races.html")).unwrap();

    assert_eq!(races.len(), 3);
    assert!(races[0].is_stage_race);
    assert!(!races[0].cancelled);
    assert!(races[1].cancelled);
    assert!(!races[2].is_stage_race);
    assert_eq!(races[2].classification, "1.UWT");
    assert_eq!(races[2].url, "https://www.procyclingstats.com/race/liege-bastogne-liege/2020");
}

#[test]
fn test_team_list_assigns_tier_by_group() {
    let teams = team_list(&parse_fixture("teams.html")).unwrap();
    let tiers: Vec<TeamTier> = teams.iter().map(|t| t.tier).collect();

    assert_eq!(
        tiers,
        vec![TeamTier::WorldTeam, TeamTier::WorldTeam, TeamTier::ProTeam, TeamTier::Continental]
    );
    assert_eq!(teams[1].name, "Team Jumbo-Visma");
    assert_eq!(teams[2].name, "Alpecin-Fenix");
    assert_eq!(teams[3].nationality, None);
}

#[test]
fn test_rider_list() {
    let riders = rider_list(&parse_fixture("riders.html")).unwrap();

    assert_eq!(riders.len(), 2);
    assert_eq!(riders[0].name, "POGAČAR Tadej");
    assert_eq!(riders[0].age, 22);
    assert_eq!(riders[0].points, 2864);
    assert_eq!(riders[1].url, "https://www.procyclingstats.com/rider/alexander-kristoff");
}

#[test]
fn test_rider_seasons_stop_at_more() {
    assert_eq!(rider_seasons(&parse_fixture("rider.html")).unwrap(), vec![2020, 2019]);
}

#[test]
fn test_rider_year_results_folds_race_context() {
    let rows = rider_year_results(&parse_fixture("rider_season.html"), 2020).unwrap();

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.year == 2020));

    let events: Vec<EventType> = rows.iter().map(|r| r.event).collect();
    assert_eq!(
        events,
        vec![EventType::Stage, EventType::Stage, EventType::GeneralClassification, EventType::OneDay]
    );

    assert!(rows[..3].iter().all(|r| r.race_name == "Tour de France"));
    assert!(rows[..3].iter().all(|r| r.country.as_deref() == Some("fr")));
    assert_eq!(rows[0].stage_name.as_deref(), Some("Stage 15 - Lyon › Grand Colombier"));
    assert_eq!(rows[1].distance_km, Some(36.2));
    assert_eq!(rows[2].distance_km, None);
    assert_eq!(rows[2].uci_points, 1000);

    assert_eq!(rows[3].race_name, "Liège-Bastogne-Liège");
    assert_eq!(rows[3].country.as_deref(), Some("be"));
    assert_eq!(rows[3].position, Some(3));
    assert_eq!(rows[3].uci_points, 300);
}

#[test]
fn test_malformed_cell_names_column() {
    let html = load("one_day_results.html").replace("<td>30</td>", "<td>thirty</td>");
    let err = one_day_results(&Document::parse(&html).unwrap()).unwrap_err();

    assert!(err.to_string().contains("one-day result row.age"));
}

#[tokio::test]
async fn test_stage_race_driver_aligns_with_stages() {
    let fetcher = SavedPages::new(&[
        (OVERVIEW, "stage_overview.html"),
        (STAGE_1, "stage_results.html"),
        (STAGE_2, "stage_no_results.html"),
        (STAGE_3, "stage_results.html"),
    ]);

    let tables = all_stage_results(&fetcher, OVERVIEW).await.unwrap();

    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0].rows().map(<[_]>::len), Some(3));
    assert!(tables[1].is_no_data());
    assert!(!tables[2].is_no_data());
}

#[tokio::test]
async fn test_stage_race_driver_failure_policies() {
    let fetcher = SavedPages::new(&[
        (OVERVIEW, "stage_overview.html"),
        (STAGE_1, "stage_results.html"),
        (STAGE_2, "stage_no_results.html"),
    ]);

    assert!(all_stage_results(&fetcher, OVERVIEW).await.is_err());

    let outcomes = stage_results_by_stage(&fetcher, OVERVIEW).await.unwrap();
    let names: Vec<&str> = outcomes.iter().map(|o| o.stage.stage_name.as_str()).collect();
    assert_eq!(names, vec!["Stage 1", "Stage 2", "Stage 3"]);
    assert!(outcomes[0].results.is_ok());
    assert!(outcomes[1].results.as_ref().unwrap().is_no_data());
    assert!(matches!(outcomes[2].results, Err(PelotonError::Timeout { .. })));
}

#[tokio::test]
async fn test_rider_career_all_or_nothing() {
    let complete = SavedPages::new(&[
        (RIDER, "rider.html"),
        ("https://www.procyclingstats.com/rider/tadej-pogacar/2020", "rider_season.html"),
        ("https://www.procyclingstats.com/rider/tadej-pogacar/2019", "rider_season.html"),
    ]);
    let career = rider_career(&complete, RIDER).await.unwrap();
    assert_eq!(career.len(), 8);
    assert_eq!(career[0].year, 2020);
    assert_eq!(career[4].year, 2019);

    let missing_2019 = SavedPages::new(&[
        (RIDER, "rider.html"),
        ("https://www.procyclingstats.com/rider/tadej-pogacar/2020", "rider_season.html"),
    ]);
    assert!(rider_career(&missing_2019, RIDER).await.is_err());

    let seasons = rider_career_by_season(&missing_2019, RIDER).await.unwrap();
    assert_eq!(seasons.iter().map(|s| s.year).collect::<Vec<_>>(), vec![2020, 2019]);
    assert_eq!(seasons[0].results.as_ref().unwrap().len(), 4);
    assert!(seasons[1].results.is_err());
}
