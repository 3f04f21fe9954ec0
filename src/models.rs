use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Inclusive analysis window over order departure dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Lower datetime bound, suitable for a `<datetime>` cast in SurrealQL.
    pub fn start_bound(&self) -> String {
        format!("{}T00:00:00Z", self.start)
    }

    /// Upper datetime bound (inclusive, end of day).
    pub fn end_bound(&self) -> String {
        format!("{}T23:59:59Z", self.end)
    }

    /// Number of calendar days covered, both endpoints included.
    pub fn period_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Raw record from CSV ingestion
#[derive(Debug, Deserialize)]
pub struct CsvOrder {
    pub order_id: String,
    pub passenger: String,
    pub origin: String,
    pub destination: String,
    pub depart_date: String,
    pub total_price: f64,
}

/// Flight-ticket order for SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub passenger: String,
    pub origin: String,
    pub destination: String,
    pub depart_date: NaiveDateTime,
    pub total_price: f64,
}

impl CsvOrder {
    pub fn to_order(&self) -> anyhow::Result<Order> {
        let depart_date =
            NaiveDateTime::parse_from_str(&self.depart_date, "%Y-%m-%d %H:%M:%S")?;

        Ok(Order {
            order_id: self.order_id.clone(),
            passenger: self.passenger.clone(),
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            depart_date,
            total_price: self.total_price,
        })
    }
}

/// Directed route between two airports, sourced from the graph edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub flight_time_hr: Option<f64>,
}

/// One calendar day of sales. Days with zero orders are never emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySalesPoint {
    pub date: NaiveDate,
    pub daily_sales: f64,
    pub daily_orders: i64,
}

/// Summed sales for one (origin, destination) pair over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSales {
    pub origin: String,
    pub destination: String,
    pub total_sales: f64,
    pub total_orders: i64,
}

/// Route joined with its sales totals. Unsold routes carry explicit zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSalesRow {
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub flight_time_hr: Option<f64>,
    pub total_sales: f64,
    pub total_orders: i64,
}

/// Which variant of the pipeline a scenario ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioMode {
    /// No indexes, one aggregation per route, unfiltered route query.
    Baseline,
    /// Indexes in place, single batch aggregation, filtered route query.
    Optimized,
}

impl ScenarioMode {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioMode::Baseline => "baseline",
            ScenarioMode::Optimized => "optimized",
        }
    }
}

/// Per-step query durations in seconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StepTimings {
    pub totals_secs: f64,
    pub daily_trend_secs: f64,
    pub route_fetch_secs: f64,
    pub route_sales_secs: f64,
}

impl StepTimings {
    pub fn total_secs(&self) -> f64 {
        self.totals_secs + self.daily_trend_secs + self.route_fetch_secs + self.route_sales_secs
    }
}

/// Everything one scenario run produced. Built fresh per invocation and
/// discarded once insights/rendering consume it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub mode: ScenarioMode,
    pub total_sales: f64,
    pub total_orders: i64,
    pub daily_trend: Vec<DailySalesPoint>,
    /// Sorted descending by total_sales.
    pub route_sales: Vec<RouteSalesRow>,
    pub timings: StepTimings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_days_counts_both_endpoints() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 9).unwrap(),
        );
        assert_eq!(range.period_days(), 31);

        let one_day = DateRange::new(range.start, range.start);
        assert_eq!(one_day.period_days(), 1);
    }

    #[test]
    fn datetime_bounds_cover_whole_days() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 11).unwrap(),
        );
        assert_eq!(range.start_bound(), "2023-03-10T00:00:00Z");
        assert_eq!(range.end_bound(), "2023-03-11T23:59:59Z");
    }

    #[test]
    fn csv_order_parses_depart_date() {
        let record = CsvOrder {
            order_id: "ORD-1".into(),
            passenger: "A. Traveler".into(),
            origin: "CGK".into(),
            destination: "DPS".into(),
            depart_date: "2023-03-10 08:30:00".into(),
            total_price: 120.0,
        };
        let order = record.to_order().unwrap();
        assert_eq!(
            order.depart_date.date(),
            NaiveDate::from_ymd_opt(2023, 3, 10).unwrap()
        );

        let bad = CsvOrder {
            depart_date: "10/03/2023".into(),
            ..record
        };
        assert!(bad.to_order().is_err());
    }

    #[test]
    fn step_timings_total_sums_all_steps() {
        let timings = StepTimings {
            totals_secs: 0.1,
            daily_trend_secs: 0.2,
            route_fetch_secs: 0.3,
            route_sales_secs: 0.4,
        };
        assert!((timings.total_secs() - 1.0).abs() < 1e-9);
    }
}
