//! Row parsers: one DOM row or list item in, one typed record out.
//!
//! Table rows are read through the [`RowSchema`]s declared here, so every
//! parser states its expected layout up front and fails with
//! [`PelotonError::ShapeMismatch`] on a short row.
//!
//! Rows of a rider's season page are not independent: a race header row
//! carries the race name, class and country for the stage and classification
//! rows below it. [`RiderYearFold`] holds that context between calls.

use crate::coerce::{absolute_url, flag_code, parse_distance, parse_int, strip_substrings};
use crate::parse::Element;
use crate::records::{
    EventType, OneDayResultRow, RaceListing, RiderCareerRow, RiderListing, Stage, StageListing, StageResultRow,
    TeamListing, TeamTier,
};
use crate::schema::{Column, ColumnKind, GAP, POSITION, RowSchema};
use crate::{PelotonError, Result};

/// Links inside a stage list item: name, profile badge, route.
pub static STAGE_LINK: RowSchema = RowSchema {
    name: "stage list item",
    columns: &[
        Column::new("name", ColumnKind::Text),
        Column::new("profile", ColumnKind::Text),
        Column::new("route", ColumnKind::Text),
    ],
};

pub static STAGE_RESULT_ROW: RowSchema = RowSchema {
    name: "stage result row",
    columns: &[
        Column::new("stage_pos", POSITION),
        Column::new("gc_pos", POSITION),
        Column::new("gc_gap", GAP),
        Column::new("bib", ColumnKind::Integer),
        Column::new("rider", ColumnKind::Text),
        Column::new("age", ColumnKind::Integer),
        Column::new("team", ColumnKind::Text),
        Column::new("uci_points", ColumnKind::Points),
        Column::new("pcs_points", ColumnKind::Points),
        Column::new("time", ColumnKind::Time),
    ],
};

pub static ONE_DAY_RESULT_ROW: RowSchema = RowSchema {
    name: "one-day result row",
    columns: &[
        Column::new("pos", POSITION),
        Column::new("bib", ColumnKind::Integer),
        Column::new("rider", ColumnKind::Text),
        Column::new("age", ColumnKind::Integer),
        Column::new("team", ColumnKind::Text),
        Column::new("uci_points", ColumnKind::Points),
        Column::new("pcs_points", ColumnKind::Points),
        Column::new("time", ColumnKind::Time),
    ],
};

pub static RACE_CALENDAR_ROW: RowSchema = RowSchema {
    name: "race calendar row",
    columns: &[
        Column::new("date", ColumnKind::Text),
        Column::new("race", ColumnKind::Text),
        Column::new("class", ColumnKind::Text),
    ],
};

pub static RIDER_YEAR_ROW: RowSchema = RowSchema {
    name: "rider season row",
    columns: &[
        Column::new("date", ColumnKind::Text),
        Column::new("result", POSITION),
        Column::new("gc", POSITION),
        Column::new("flag", ColumnKind::Text),
        Column::new("race", ColumnKind::Text),
        Column::new("class", ColumnKind::Text),
        Column::new("distance", ColumnKind::Distance),
        Column::new("pcs_points", ColumnKind::Points),
        Column::new("uci_points", ColumnKind::Points),
    ],
};

/// Route separator between start and finish, e.g. `Nice › Sisteron`.
const ROUTE_SEPARATOR: char = '›';

/// Nationality code of the first `span.flag` under `el`.
fn nationality(el: &Element<'_>) -> Result<Option<String>> {
    Ok(el.find_optional("span.flag")?.and_then(|flag| flag_code(&flag.classes())))
}

/// Link text with the text of its nested badge spans removed.
fn name_without_badges(link: &Element<'_>) -> Result<String> {
    let badges: Vec<String> = link.select("span")?.iter().map(Element::text).collect();
    let fragments: Vec<&str> = badges.iter().map(String::as_str).collect();
    Ok(strip_substrings(&link.text(), &fragments))
}

fn link_url(el: &Element<'_>) -> Result<String> {
    let link = el.find("a")?;
    absolute_url(link.required_attr("href")?)
}

/// Reads the `pN` class from a `span.profile` badge.
fn profile_code(badge: &Element<'_>) -> Option<String> {
    badge
        .classes()
        .into_iter()
        .find(|c| c.len() > 1 && c.starts_with('p') && c[1..].chars().all(|ch| ch.is_ascii_digit()))
        .map(str::to_string)
}

/// Parses one `li` of a stage race's stage list.
pub fn parse_stage_list_item(item: Element<'_>) -> Result<StageListing> {
    if item.trimmed_text().eq_ignore_ascii_case("rest day") {
        return Ok(StageListing::RestDay);
    }

    let date = item.find("div")?.trimmed_text();
    let link = item.find("a")?;
    let url = absolute_url(link.required_attr("href")?)?;

    let parts = STAGE_LINK.bind(link.children("div"))?;
    let stage_name = parts.text("name")?;
    let profile = parts
        .cell("profile")?
        .find_optional("span.profile")?
        .and_then(|badge| profile_code(&badge));

    let route = parts.text("route")?;
    let (start, end) = route
        .split_once(ROUTE_SEPARATOR)
        .ok_or_else(|| PelotonError::invalid_value("stage route", &route))?;

    let distance_text = link
        .children("span")
        .first()
        .map(Element::trimmed_text)
        .ok_or_else(|| PelotonError::missing(format!("{} > span", link.describe())))?;
    let distance_km = parse_distance(&distance_text)?;

    Ok(StageListing::Stage(Stage {
        date,
        stage_name,
        start_location: start.trim().to_string(),
        end_location: end.trim().to_string(),
        profile,
        distance_km,
        url,
    }))
}

/// Time cell text: the `span.timeff` when present, otherwise the whole cell.
fn time_text(cell: &Element<'_>) -> Result<String> {
    Ok(match cell.find_optional("span.timeff")? {
        Some(span) => span.trimmed_text(),
        None => cell.trimmed_text(),
    })
}

/// Parses one `tr` of a stage's results table.
pub fn parse_stage_result_row(row: Element<'_>) -> Result<StageResultRow> {
    let cells = STAGE_RESULT_ROW.bind(row.children("td"))?;

    let team = cells.text("team")?;
    let rider_cell = cells.cell("rider")?;
    let rider = strip_substrings(&rider_cell.text(), &[team.as_str()]);
    let time = cells.time_from("time", &time_text(&cells.cell("time")?)?)?;

    Ok(StageResultRow {
        stage_position: cells.position("stage_pos")?,
        gc_position: cells.position("gc_pos")?,
        gc_gap: cells.gap("gc_gap")?,
        bib: cells.integer("bib")?,
        age: cells.integer("age")?,
        nationality: nationality(&rider_cell)?,
        team,
        rider,
        uci_points: cells.points("uci_points")?,
        pcs_points: cells.points("pcs_points")?,
        time,
    })
}

/// Parses one `tr` of a one-day race's results table.
pub fn parse_one_day_result_row(row: Element<'_>) -> Result<OneDayResultRow> {
    let cells = ONE_DAY_RESULT_ROW.bind(row.children("td"))?;

    let team = cells.text("team")?;
    let rider_cell = cells.cell("rider")?;
    let rider = strip_substrings(&rider_cell.text(), &[team.as_str()]);
    let time = cells.time_from("time", &time_text(&cells.cell("time")?)?)?;

    Ok(OneDayResultRow {
        position: cells.position("pos")?,
        bib: cells.integer("bib")?,
        age: cells.integer("age")?,
        nationality: nationality(&rider_cell)?,
        team,
        rider,
        uci_points: cells.points("uci_points")?,
        pcs_points: cells.points("pcs_points")?,
        time,
    })
}

/// Parses one `tr` of the season calendar.
///
/// A `-` in the date marks a date range and so a stage race; the `striked`
/// row class marks a cancelled race.
pub fn parse_race_calendar_row(row: Element<'_>) -> Result<RaceListing> {
    let cells = RACE_CALENDAR_ROW.bind(row.children("td"))?;
    let date = cells.text("date")?;
    let race = cells.cell("race")?;

    Ok(RaceListing {
        is_stage_race: date.contains('-'),
        date,
        name: race.find("a")?.trimmed_text(),
        classification: cells.text("class")?,
        country: nationality(&race)?,
        cancelled: row.has_class("striked"),
        url: link_url(&race)?,
    })
}

/// Parses one `li` of a team group. The tier comes from the group, not the item.
pub fn parse_team_list_item(item: Element<'_>, tier: TeamTier) -> Result<TeamListing> {
    let link = item.find("a")?;

    Ok(TeamListing {
        name: name_without_badges(&link)?,
        nationality: nationality(&item)?,
        url: absolute_url(link.required_attr("href")?)?,
        tier,
    })
}

/// Parses one `li` of a rider list; age and points come from data attributes.
pub fn parse_rider_list_item(item: Element<'_>) -> Result<RiderListing> {
    let link = item.find("a")?;
    let age = parse_int(item.required_attr("data-age")?, "data-age")?;
    let points = parse_int(item.required_attr("data-points")?, "data-points")?;

    Ok(RiderListing {
        name: name_without_badges(&link)?,
        nationality: nationality(&item)?,
        points,
        age,
        url: absolute_url(link.required_attr("href")?)?,
    })
}

/// Race context carried from a header row to the rows below it.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceContext {
    pub race_name: String,
    pub race_class: String,
    pub country: Option<String>,
}

/// Fold state over the rows of a rider's season table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FoldState {
    /// No race header seen yet.
    #[default]
    AwaitingContext,
    HaveContext(RaceContext),
}

/// Stateful parser for the rows of one rider season table.
///
/// Row kinds, from the `data-main` attribute and the date/result cells:
///
/// | `data-main` | result | date | kind |
/// |---|---|---|---|
/// | `1` | empty | any | race header: sets context, emits nothing |
/// | `1` | set | any | one-day race: self-contained, clears context |
/// | `0` | any | set | stage of the current race |
/// | `0` | any | empty | final classification of the current race |
///
/// Stage and classification rows never change the context.
#[derive(Debug)]
pub struct RiderYearFold {
    state: FoldState,
    year: u16,
    rows_seen: usize,
}

impl RiderYearFold {
    pub fn new(year: u16) -> Self {
        Self { state: FoldState::default(), year, rows_seen: 0 }
    }

    pub fn state(&self) -> &FoldState {
        &self.state
    }

    /// Consumes one row. Returns `None` for header rows.
    ///
    /// # Errors
    ///
    /// [`PelotonError::MissingContext`] for a stage or classification row
    /// before any header, [`PelotonError::InvalidValue`] for an unknown
    /// `data-main` value or classification label.
    pub fn step(&mut self, row: Element<'_>) -> Result<Option<RiderCareerRow>> {
        let index = self.rows_seen;
        self.rows_seen += 1;

        let main = row.required_attr("data-main")?;
        let cells = RIDER_YEAR_ROW.bind(row.children("td"))?;
        let date = cells.text("date")?;
        let race = cells.cell("race")?;
        let own = RaceContext {
            race_name: race.trimmed_text(),
            race_class: cells.text("class")?,
            country: nationality(&cells.cell("flag")?)?,
        };

        let (event, context, stage_name) = match main.trim() {
            "1" if cells.text("result")?.is_empty() => {
                self.state = FoldState::HaveContext(own);
                return Ok(None);
            }
            "1" => {
                self.state = FoldState::AwaitingContext;
                (EventType::OneDay, own, None)
            }
            "0" => {
                let context = match &self.state {
                    FoldState::HaveContext(context) => context.clone(),
                    FoldState::AwaitingContext => return Err(PelotonError::MissingContext { row: index }),
                };
                if date.is_empty() {
                    let event = EventType::from_classification(&own.race_name)
                        .ok_or_else(|| PelotonError::invalid_value("classification", &own.race_name))?;
                    (event, context, None)
                } else {
                    (EventType::Stage, context, Some(own.race_name))
                }
            }
            other => return Err(PelotonError::invalid_value("data-main", other)),
        };

        Ok(Some(RiderCareerRow {
            date,
            event,
            position: cells.position("result")?,
            gc_position: cells.position("gc")?,
            country: context.country,
            race_name: context.race_name,
            race_class: context.race_class,
            stage_name,
            distance_km: cells.distance("distance")?,
            pcs_points: cells.points("pcs_points")?,
            uci_points: cells.points("uci_points")?,
            url: link_url(&race)?,
            year: self.year,
        }))
    }
}
