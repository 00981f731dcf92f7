//! Page extractors: one function per page type.
//!
//! Each extractor follows a fixed lookup path from the document root to the
//! container holding the rows, then runs every row through its parser from
//! [`crate::rows`] and returns the records in source order.
//!
//! | Page | Path |
//! |---|---|
//! | stage race overview | `div.w36` > second `ul` > `li` |
//! | stage results | first `table` > `tbody` > `tr` |
//! | one-day results | first `table` > `tbody` > `tr` |
//! | race calendar | `table.basic` > `tbody` > `tr` |
//! | teams | `div.teams` > `div` group per tier > `ul` > `li` |
//! | riders | `div.riders` > `ul` > `li` |
//! | rider season | `table.rdrResults` > `tbody` > `tr` |
//! | rider seasons nav | `ul.rdrSeasonNav` > `li` |
//!
//! A missing container is [`PelotonError::MissingNode`]; a container without
//! rows is an empty table. The one exception is [`stage_results`], which
//! reports a page with no table at all as [`ResultsTable::NoData`].

use tracing::debug;

use crate::parse::{Document, Element};
use crate::records::{
    OneDayResultRow, RaceListing, ResultsTable, RiderCareerRow, RiderListing, StageListing, StageResultRow,
    TeamListing, TeamTier,
};
use crate::rows::{
    RiderYearFold, parse_one_day_result_row, parse_race_calendar_row, parse_rider_list_item,
    parse_stage_list_item, parse_stage_result_row, parse_team_list_item,
};
use crate::{PelotonError, Result};

fn collect<'a, T>(items: Vec<Element<'a>>, parse: impl Fn(Element<'a>) -> Result<T>) -> Result<Vec<T>> {
    items.into_iter().map(parse).collect()
}

/// Body rows of a results-style table.
fn body_rows<'a>(table: &Element<'a>) -> Result<Vec<Element<'a>>> {
    Ok(table.find("tbody")?.children("tr"))
}

/// Extracts the stage list from a stage race overview page.
///
/// Rest days are kept as [`StageListing::RestDay`] rows in their position.
pub fn stage_list(doc: &Document) -> Result<Vec<StageListing>> {
    let list = doc.find("div.w36")?.nth("ul", 1)?;
    let stages = collect(list.children("li"), parse_stage_list_item)?;

    debug!(
        stages = stages.len(),
        rest_days = stages.iter().filter(|s| s.is_rest_day()).count(),
        "extracted stage list"
    );
    Ok(stages)
}

/// Extracts the results of one stage of a stage race.
///
/// Returns [`ResultsTable::NoData`] when the page has no results table, e.g.
/// a stage that has not been raced yet.
pub fn stage_results(doc: &Document) -> Result<ResultsTable<StageResultRow>> {
    let Some(table) = doc.find_optional("table")? else {
        debug!("no results table on stage page");
        return Ok(ResultsTable::NoData);
    };

    let rows = collect(body_rows(&table)?, parse_stage_result_row)?;
    debug!(rows = rows.len(), "extracted stage results");
    Ok(ResultsTable::Rows(rows))
}

/// Extracts the results of a one-day race.
pub fn one_day_results(doc: &Document) -> Result<Vec<OneDayResultRow>> {
    let table = doc.find("table")?;
    let rows = collect(body_rows(&table)?, parse_one_day_result_row)?;

    debug!(rows = rows.len(), "extracted one-day results");
    Ok(rows)
}

/// Extracts the races of a season calendar page.
pub fn race_calendar(doc: &Document) -> Result<Vec<RaceListing>> {
    let table = doc.find("table.basic")?;
    let races = collect(body_rows(&table)?, parse_race_calendar_row)?;

    debug!(races = races.len(), "extracted race calendar");
    Ok(races)
}

/// Extracts the teams page.
///
/// Teams are listed in one `div` group per tier, in [`TeamTier::ORDER`]; a
/// team's tier is the tier of its group.
pub fn team_list(doc: &Document) -> Result<Vec<TeamListing>> {
    let container = doc.find("div.teams")?;
    let groups = container.children("div");

    if groups.len() > TeamTier::ORDER.len() {
        return Err(PelotonError::invalid_value(
            "team groups",
            &format!("{} groups for {} tiers", groups.len(), TeamTier::ORDER.len()),
        ));
    }

    let mut teams = Vec::new();
    for (group, tier) in groups.iter().zip(TeamTier::ORDER) {
        let items = group.find("ul")?.children("li");
        for item in items {
            teams.push(parse_team_list_item(item, tier)?);
        }
    }

    debug!(teams = teams.len(), groups = groups.len(), "extracted team list");
    Ok(teams)
}

/// Extracts a rider list (e.g. a team roster).
pub fn rider_list(doc: &Document) -> Result<Vec<RiderListing>> {
    let list = doc.find("div.riders")?.find("ul")?;
    let riders = collect(list.children("li"), parse_rider_list_item)?;

    debug!(riders = riders.len(), "extracted rider list");
    Ok(riders)
}

/// Extracts one season of a rider's results, tagging every row with `year`.
///
/// Race header rows only provide context and never become records.
pub fn rider_year_results(doc: &Document, year: u16) -> Result<Vec<RiderCareerRow>> {
    let table = doc.find("table.rdrResults")?;
    let mut fold = RiderYearFold::new(year);
    let mut results = Vec::new();

    for row in body_rows(&table)? {
        if let Some(record) = fold.step(row)? {
            results.push(record);
        }
    }

    debug!(year, results = results.len(), "extracted rider season");
    Ok(results)
}

/// Reads the season years from a rider page's season navigation.
///
/// Stops at the first "more" entry. Years keep document order, which on the
/// site is most recent first.
pub fn rider_seasons(doc: &Document) -> Result<Vec<u16>> {
    let nav = doc.find("ul.rdrSeasonNav")?;
    let mut seasons = Vec::new();

    for item in nav.children("li") {
        let text = item.trimmed_text();
        if item.has_class("more") || text.to_lowercase().contains("more") {
            break;
        }
        let year = text.parse::<u16>().map_err(|_| PelotonError::invalid_number("season", &text))?;
        seasons.push(year);
    }

    debug!(seasons = seasons.len(), "extracted rider seasons");
    Ok(seasons)
}
