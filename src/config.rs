//! Environment-driven runtime configuration.
//!
//! Every setting has a shipped default so the binaries run out of the box;
//! FLIGHTS_DB_PATH, FLIGHTS_START_DATE and FLIGHTS_END_DATE override them.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::models::DateRange;

pub const DEFAULT_DB_PATH: &str = "data/flights.db";
pub const DEFAULT_START_DATE: &str = "2023-03-10";
pub const DEFAULT_END_DATE: &str = "2023-04-09";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub default_range: DateRange,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_path =
            std::env::var("FLIGHTS_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let start = date_from_env("FLIGHTS_START_DATE", DEFAULT_START_DATE)?;
        let end = date_from_env("FLIGHTS_END_DATE", DEFAULT_END_DATE)?;

        Ok(Self {
            db_path,
            default_range: DateRange::new(start, end),
        })
    }
}

fn date_from_env(key: &str, default: &str) -> Result<NaiveDate> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .with_context(|| format!("{key}: expected YYYY-MM-DD, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let start = NaiveDate::parse_from_str(DEFAULT_START_DATE, "%Y-%m-%d").unwrap();
        let end = NaiveDate::parse_from_str(DEFAULT_END_DATE, "%Y-%m-%d").unwrap();
        assert!(start < end);
    }
}
