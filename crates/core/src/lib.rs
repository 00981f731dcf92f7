pub mod coerce;
pub mod drivers;
pub mod error;
pub mod fetch;
pub mod pages;
pub mod parse;
pub mod records;
pub mod rows;
pub mod schema;

pub use coerce::{
    SITE_ORIGIN, absolute_url, parse_distance, parse_duration, parse_gap, parse_int, parse_nullable_int, parse_points,
    strip_substrings,
};
pub use drivers::{
    SeasonResult, StageOutcome, all_stage_results, rider_career, rider_career_by_season, season_url,
    stage_results_by_stage,
};
pub use error::{PelotonError, Result};
pub use fetch::{FetchConfig, FetchConfigBuilder, PageFetcher};
pub use fetch::{fetch_file, fetch_stdin};
#[cfg(feature = "fetch")]
pub use fetch::{HttpFetcher, fetch_url};
pub use pages::{
    one_day_results, race_calendar, rider_list, rider_seasons, rider_year_results, stage_list, stage_results, team_list,
};
pub use parse::{Document, Element};
pub use records::{
    EventType, OneDayResultRow, REST_DAY, RaceListing, ResultsTable, RiderCareerRow, RiderListing, Stage, StageListing,
    StageResultRow, TeamListing, TeamTier,
};
#[doc(hidden)]
pub use rows::{FoldState, RaceContext, RiderYearFold};
#[doc(hidden)]
pub use schema::{BoundRow, Column, ColumnKind, RowSchema};
