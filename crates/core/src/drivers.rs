//! Multi-page drivers over a [`PageFetcher`].
//!
//! * Career aggregation: a rider page lists the rider's seasons; each season
//!   page is extracted with [`rider_year_results`] and the tables are
//!   concatenated in season order.
//! * Stage-race driving: an overview page lists the stages; each raced stage's
//!   results page is extracted with [`stage_results`].
//!
//! Pages are fetched strictly one after another. Both drivers come in two
//! failure policies:
//!
//! * `*_by_season` / `*_by_stage` return one `Result` per unit, so the caller
//!   decides whether partial data is acceptable;
//! * [`rider_career`] / [`all_stage_results`] stop at the first failing unit
//!   and return its error, never a partial table.
//!
//! Failing to fetch or read the index page (rider page, overview page) is an
//! error under both policies.

use tracing::{info, warn};

use crate::fetch::PageFetcher;
use crate::pages::{rider_seasons, rider_year_results, stage_list, stage_results};
use crate::parse::Document;
use crate::records::{ResultsTable, RiderCareerRow, Stage, StageListing, StageResultRow};
use crate::Result;

/// Extraction outcome of one season of a rider's career.
#[derive(Debug)]
pub struct SeasonResult {
    pub year: u16,
    pub results: Result<Vec<RiderCareerRow>>,
}

/// Extraction outcome of one raced stage.
#[derive(Debug)]
pub struct StageOutcome {
    pub stage: Stage,
    pub results: Result<ResultsTable<StageResultRow>>,
}

/// URL of one season of a rider page, e.g. `.../rider/tadej-pogacar/2020`.
pub fn season_url(rider_url: &str, year: u16) -> String {
    format!("{}/{}", rider_url.trim_end_matches('/'), year)
}

async fn load_seasons<F: PageFetcher>(fetcher: &F, rider_url: &str) -> Result<Vec<u16>> {
    let page = fetcher.fetch_page(rider_url).await?;
    let seasons = rider_seasons(&Document::parse(&page)?)?;
    info!(rider = rider_url, seasons = ?seasons, "found rider seasons");
    Ok(seasons)
}

async fn fetch_season<F: PageFetcher>(fetcher: &F, rider_url: &str, year: u16) -> Result<Vec<RiderCareerRow>> {
    let page = fetcher.fetch_page(&season_url(rider_url, year)).await?;
    rider_year_results(&Document::parse(&page)?, year)
}

/// Extracts every season of a rider, one result per season in season order.
pub async fn rider_career_by_season<F: PageFetcher>(fetcher: &F, rider_url: &str) -> Result<Vec<SeasonResult>> {
    let seasons = load_seasons(fetcher, rider_url).await?;
    let mut outcomes = Vec::with_capacity(seasons.len());

    for year in seasons {
        let results = fetch_season(fetcher, rider_url, year).await;
        if let Err(e) = &results {
            warn!(year, error = %e, "season extraction failed");
        }
        outcomes.push(SeasonResult { year, results });
    }

    Ok(outcomes)
}

/// Extracts a rider's whole career as one table.
///
/// The first season that cannot be fetched or parsed aborts the call; later
/// seasons are not fetched.
pub async fn rider_career<F: PageFetcher>(fetcher: &F, rider_url: &str) -> Result<Vec<RiderCareerRow>> {
    let seasons = load_seasons(fetcher, rider_url).await?;
    let mut career = Vec::new();

    for year in seasons {
        career.extend(fetch_season(fetcher, rider_url, year).await?);
    }

    info!(rider = rider_url, rows = career.len(), "extracted rider career");
    Ok(career)
}

async fn load_stages<F: PageFetcher>(fetcher: &F, overview_url: &str) -> Result<Vec<Stage>> {
    let page = fetcher.fetch_page(overview_url).await?;
    let stages: Vec<Stage> = stage_list(&Document::parse(&page)?)?
        .into_iter()
        .filter_map(|listing| match listing {
            StageListing::Stage(stage) => Some(stage),
            StageListing::RestDay => None,
        })
        .collect();

    info!(race = overview_url, stages = stages.len(), "found raced stages");
    Ok(stages)
}

async fn fetch_stage<F: PageFetcher>(fetcher: &F, stage: &Stage) -> Result<ResultsTable<StageResultRow>> {
    let page = fetcher.fetch_page(&stage.url).await?;
    stage_results(&Document::parse(&page)?)
}

/// Extracts the results of every raced stage, one outcome per stage in
/// listed order. Rest days are skipped.
pub async fn stage_results_by_stage<F: PageFetcher>(fetcher: &F, overview_url: &str) -> Result<Vec<StageOutcome>> {
    let stages = load_stages(fetcher, overview_url).await?;
    let mut outcomes = Vec::with_capacity(stages.len());

    for stage in stages {
        let results = fetch_stage(fetcher, &stage).await;
        if let Err(e) = &results {
            warn!(stage = %stage.stage_name, error = %e, "stage extraction failed");
        }
        outcomes.push(StageOutcome { stage, results });
    }

    Ok(outcomes)
}

/// Extracts the results of every raced stage.
///
/// The returned tables line up 1:1 with the non-rest-day stages of the
/// overview. A stage page without a results table contributes
/// [`ResultsTable::NoData`] in its position. The first failing stage aborts.
pub async fn all_stage_results<F: PageFetcher>(
    fetcher: &F, overview_url: &str,
) -> Result<Vec<ResultsTable<StageResultRow>>> {
    let stages = load_stages(fetcher, overview_url).await?;
    let mut tables = Vec::with_capacity(stages.len());

    for stage in &stages {
        tables.push(fetch_stage(fetcher, stage).await?);
    }

    Ok(tables)
}
