//! Coercion of raw cell text into typed values.
//!
//! The site writes results as free text: positions that may be `DNF`, gaps
//! that may be `-`, points cells that may be empty. These functions turn that
//! text into typed values under two deliberately different defaults:
//!
//! * a missing **position** means "did not finish / unknown" and is `None`
//! * missing **points** mean "no points scored" and are `0`
//!
//! Text that matches no sentinel and still fails to parse is an error
//! ([`PelotonError::InvalidNumber`]); it is never skipped.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use peloton_core::coerce::{POSITION_SENTINELS, parse_duration, parse_nullable_int, parse_points};
//!
//! assert_eq!(parse_duration("1:02:03").unwrap(), Some(Duration::from_secs(3723)));
//! assert_eq!(parse_nullable_int("DNF", POSITION_SENTINELS).unwrap(), None);
//! assert_eq!(parse_points("").unwrap(), 0);
//! ```

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::{PelotonError, Result};

/// Origin that relative links on the site are resolved against.
pub const SITE_ORIGIN: &str = "https://www.procyclingstats.com/";

/// Placeholders written in finish-position cells instead of a number.
pub const POSITION_SENTINELS: &[&str] = &["DNF", "DNS", "OTL", "DF", "DSQ"];

/// Placeholder written in gap cells for the leader.
pub const GAP_SENTINELS: &[&str] = &["-"];

static DISTANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?\s*(\d+(?:\.\d+)?)\s*(?:km)?\s*\)?$").expect("distance pattern compiles"));

/// Parses `h:m:s` or `m:s` into a duration.
///
/// Any other shape (no colon, three or more colons, empty text) is not a
/// time and yields `Ok(None)`. When the shape matches, every component must be
/// a non-negative integer.
pub fn parse_duration(text: &str) -> Result<Option<Duration>> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(':').collect();

    let component = |part: &str| -> Result<u64> {
        part.trim()
            .parse::<u64>()
            .map_err(|_| PelotonError::invalid_number("duration", text))
    };

    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (component(h)?, component(m)?, component(s)?),
        [m, s] => (0, component(m)?, component(s)?),
        _ => return Ok(None),
    };

    let seconds = h
        .checked_mul(3600)
        .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(s))
        .ok_or_else(|| PelotonError::invalid_number("duration", text))?;

    Ok(Some(Duration::from_secs(seconds)))
}

/// Parses an integer cell that may hold a sentinel instead of a number.
///
/// Returns `None` for empty text or any member of `sentinels`.
pub fn parse_nullable_int(text: &str, sentinels: &[&str]) -> Result<Option<u32>> {
    let text = text.trim();
    if text.is_empty() || sentinels.contains(&text) {
        return Ok(None);
    }

    text.parse()
        .map(Some)
        .map_err(|_| PelotonError::invalid_number("position", text))
}

/// Parses a required integer cell (bib number, age, year).
pub fn parse_int(text: &str, field: &str) -> Result<u32> {
    let text = text.trim();
    text.parse().map_err(|_| PelotonError::invalid_number(field, text))
}

/// Parses a points cell; empty text is zero points.
///
/// A fractional value is truncated toward zero.
pub fn parse_points(text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    if let Ok(points) = text.parse::<u32>() {
        return Ok(points);
    }

    match text.parse::<f64>() {
        Ok(points) if points.is_finite() && points >= 0.0 => Ok(points.trunc() as u32),
        _ => Err(PelotonError::invalid_number("points", text)),
    }
}

/// Parses a time-gap cell such as `+0:12`.
///
/// The leader's `-` and empty cells have no gap.
pub fn parse_gap(text: &str) -> Result<Option<Duration>> {
    let text = text.trim();
    if text.is_empty() || GAP_SENTINELS.contains(&text) {
        return Ok(None);
    }
    parse_duration(text.trim_start_matches('+'))
}

/// Parses a stage length written as `(185.5km)`, `185.5 km` or `185.5`.
pub fn parse_distance(text: &str) -> Result<f64> {
    let text = text.trim();
    DISTANCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| PelotonError::invalid_number("distance", text))
}

/// Removes every fragment from `full` and trims the remainder.
///
/// Names on the site are not always isolated in their own node: a rider cell
/// holds the rider name followed by the team name, a team link holds the
/// team name followed by a class badge. The name is recovered by removing the
/// side-channel text. A fragment that happens to be a substring of the name
/// itself corrupts the result, so callers pass only badge text.
pub fn strip_substrings(full: &str, fragments: &[&str]) -> String {
    let mut out = full.to_string();
    for fragment in fragments.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        out = out.replace(fragment, "");
    }
    out.trim().to_string()
}

/// Reads the nationality code from a `flag xx` badge's class list.
pub fn flag_code(classes: &[&str]) -> Option<String> {
    if !classes.contains(&"flag") {
        return None;
    }
    classes
        .iter()
        .find(|c| **c != "flag" && c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map(|c| c.to_ascii_lowercase())
}

/// Resolves a link against [`SITE_ORIGIN`].
///
/// Absolute URLs are returned unchanged (normalised by `url`).
pub fn absolute_url(href: &str) -> Result<String> {
    let href = href.trim();
    if href.is_empty() {
        return Err(PelotonError::InvalidUrl("empty link".to_string()));
    }

    let base = Url::parse(SITE_ORIGIN).map_err(|e| PelotonError::InvalidUrl(e.to_string()))?;
    base.join(href)
        .map(String::from)
        .map_err(|e| PelotonError::InvalidUrl(format!("{}: {}", href, e)))
}
