//! Typed records produced by the extractors.
//!
//! One record is one row of a page: a stage of a race, a race in the
//! calendar, a rider's result in a stage. Records are created once by an
//! extraction call and never mutated afterwards.
//!
//! All records serialise with serde. Durations serialise as whole seconds and
//! absent values as `null`.

use std::time::Duration;

use serde::{Serialize, Serializer};

/// `stage_name` written for rest days in flat output.
pub const REST_DAY: &str = "REST DAY";

fn duration_secs<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&d.as_secs()),
        None => serializer.serialize_none(),
    }
}

/// A raced stage from a stage race overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub date: String,
    pub stage_name: String,
    pub start_location: String,
    pub end_location: String,
    /// Profile code such as `p1` (flat) to `p5` (summit finish).
    pub profile: Option<String>,
    pub distance_km: f64,
    pub url: String,
}

/// One entry of a stage race's stage list.
///
/// A row is either a stage or a rest day, never both. Serialised flat, a rest
/// day has `stage_name = "REST DAY"` and every other field `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "FlatStage")]
pub enum StageListing {
    Stage(Stage),
    RestDay,
}

impl StageListing {
    pub fn is_rest_day(&self) -> bool {
        matches!(self, StageListing::RestDay)
    }

    pub fn stage_name(&self) -> &str {
        match self {
            StageListing::Stage(stage) => &stage.stage_name,
            StageListing::RestDay => REST_DAY,
        }
    }

    pub fn as_stage(&self) -> Option<&Stage> {
        match self {
            StageListing::Stage(stage) => Some(stage),
            StageListing::RestDay => None,
        }
    }
}

#[derive(Serialize)]
struct FlatStage {
    date: Option<String>,
    stage_name: String,
    start_location: Option<String>,
    end_location: Option<String>,
    profile: Option<String>,
    distance_km: Option<f64>,
    url: Option<String>,
}

impl From<StageListing> for FlatStage {
    fn from(listing: StageListing) -> Self {
        match listing {
            StageListing::Stage(s) => Self {
                date: Some(s.date),
                stage_name: s.stage_name,
                start_location: Some(s.start_location),
                end_location: Some(s.end_location),
                profile: s.profile,
                distance_km: Some(s.distance_km),
                url: Some(s.url),
            },
            StageListing::RestDay => Self {
                date: None,
                stage_name: REST_DAY.to_string(),
                start_location: None,
                end_location: None,
                profile: None,
                distance_km: None,
                url: None,
            },
        }
    }
}

/// A race from the season calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceListing {
    /// Date or date range as written, e.g. `29.08 - 20.09`.
    pub date: String,
    pub name: String,
    pub is_stage_race: bool,
    /// UCI classification such as `2.UWT` or `1.Pro`.
    pub classification: String,
    pub country: Option<String>,
    pub cancelled: bool,
    pub url: String,
}

/// Team classification tier, assigned by the group a team is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TeamTier {
    #[serde(rename = "WT")]
    WorldTeam,
    #[serde(rename = "PRT")]
    ProTeam,
    #[serde(rename = "CT")]
    Continental,
}

impl TeamTier {
    /// Tiers in the order their groups appear on the teams page.
    pub const ORDER: [TeamTier; 3] = [TeamTier::WorldTeam, TeamTier::ProTeam, TeamTier::Continental];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamListing {
    pub name: String,
    pub nationality: Option<String>,
    pub url: String,
    pub tier: TeamTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderListing {
    pub name: String,
    pub nationality: Option<String>,
    /// Career PCS points.
    pub points: u32,
    pub age: u32,
    pub url: String,
}

/// One rider's line in a stage of a stage race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResultRow {
    /// `None` when the rider did not finish, start, or make the time cut.
    pub stage_position: Option<u32>,
    pub gc_position: Option<u32>,
    /// Gap to the GC leader after the stage; `None` for the leader.
    #[serde(serialize_with = "duration_secs")]
    pub gc_gap: Option<Duration>,
    pub bib: u32,
    pub age: u32,
    pub team: String,
    pub rider: String,
    pub nationality: Option<String>,
    pub uci_points: u32,
    pub pcs_points: u32,
    /// Winner's time or the gap to the winner.
    #[serde(serialize_with = "duration_secs")]
    pub time: Option<Duration>,
}

/// One rider's line in a one-day race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneDayResultRow {
    pub position: Option<u32>,
    pub bib: u32,
    pub age: u32,
    pub team: String,
    pub rider: String,
    pub nationality: Option<String>,
    pub uci_points: u32,
    pub pcs_points: u32,
    #[serde(serialize_with = "duration_secs")]
    pub time: Option<Duration>,
}

/// Kind of result on a rider's season page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    Stage,
    OneDay,
    PointsClassification,
    MountainsClassification,
    GeneralClassification,
    YouthClassification,
}

impl EventType {
    /// Maps a classification label (e.g. `General classification`) to its type.
    pub fn from_classification(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("general") {
            Some(EventType::GeneralClassification)
        } else if label.contains("points") {
            Some(EventType::PointsClassification)
        } else if label.contains("mountain") || label.contains("kom") {
            Some(EventType::MountainsClassification)
        } else if label.contains("youth") {
            Some(EventType::YouthClassification)
        } else {
            None
        }
    }
}

/// One result from a rider's season, with its race context filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderCareerRow {
    pub date: String,
    pub event: EventType,
    pub position: Option<u32>,
    pub gc_position: Option<u32>,
    pub country: Option<String>,
    pub race_name: String,
    pub race_class: String,
    /// Stage label for [`EventType::Stage`] rows.
    pub stage_name: Option<String>,
    pub distance_km: Option<f64>,
    pub pcs_points: u32,
    pub uci_points: u32,
    pub url: String,
    pub year: u16,
}

/// Output of a results page: either its rows, or nothing because the page has
/// no results table (the stage has not been run).
///
/// `NoData` is distinct from `Rows(vec![])`, a table with zero finishers.
/// It serialises as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultsTable<T> {
    Rows(Vec<T>),
    NoData,
}

impl<T> ResultsTable<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ResultsTable::NoData)
    }

    pub fn rows(&self) -> Option<&[T]> {
        match self {
            ResultsTable::Rows(rows) => Some(rows),
            ResultsTable::NoData => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rest_day_serialises_flat() {
        let value = serde_json::to_value(StageListing::RestDay).unwrap();
        assert_eq!(
            value,
            json!({
                "date": null,
                "stage_name": "REST DAY",
                "start_location": null,
                "end_location": null,
                "profile": null,
                "distance_km": null,
                "url": null,
            })
        );
    }

    #[test]
    fn test_stage_serialises_flat() {
        let listing = StageListing::Stage(Stage {
            date: "29/08".to_string(),
            stage_name: "Stage 1".to_string(),
            start_location: "Nice".to_string(),
            end_location: "Nice".to_string(),
            profile: Some("p2".to_string()),
            distance_km: 156.0,
            url: "https://www.procyclingstats.com/race/tour-de-france/2020/stage-1".to_string(),
        });
        let value = serde_json::to_value(&listing).unwrap();

        assert_eq!(value["stage_name"], "Stage 1");
        assert_eq!(value["distance_km"], 156.0);
        assert_eq!(listing.stage_name(), "Stage 1");
        assert!(!listing.is_rest_day());
    }

    #[test]
    fn test_durations_serialise_as_seconds() {
        let row = OneDayResultRow {
            position: None,
            bib: 1,
            age: 30,
            team: "Team".to_string(),
            rider: "Rider".to_string(),
            nationality: None,
            uci_points: 0,
            pcs_points: 0,
            time: Some(Duration::from_secs(3723)),
        };
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["time"], 3723);
        assert_eq!(value["position"], serde_json::Value::Null);
    }

    #[test]
    fn test_no_data_is_not_an_empty_table() {
        let empty: ResultsTable<OneDayResultRow> = ResultsTable::Rows(Vec::new());
        let none: ResultsTable<OneDayResultRow> = ResultsTable::NoData;

        assert_ne!(empty, none);
        assert_eq!(empty.rows().map(<[_]>::len), Some(0));
        assert!(none.is_no_data());
        assert_eq!(serde_json::to_value(&none).unwrap(), serde_json::Value::Null);
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!([]));
    }

    #[test]
    fn test_event_type_from_classification() {
        assert_eq!(
            EventType::from_classification("General classification"),
            Some(EventType::GeneralClassification)
        );
        assert_eq!(
            EventType::from_classification("Points classification"),
            Some(EventType::PointsClassification)
        );
        assert_eq!(
            EventType::from_classification("Mountains classification"),
            Some(EventType::MountainsClassification)
        );
        assert_eq!(
            EventType::from_classification("Youth classification"),
            Some(EventType::YouthClassification)
        );
        assert_eq!(EventType::from_classification("Team classification"), None);
    }

    #[test]
    fn test_tier_codes() {
        assert_eq!(serde_json::to_value(TeamTier::ProTeam).unwrap(), "PRT");
        assert_eq!(serde_json::to_value(TeamTier::ORDER).unwrap(), serde_json::json!(["WT", "PRT", "CT"]));
    }
}
