//! Scenario runner: one full pass of the analytics pipeline under a fixed
//! optimization mode.
//!
//! The sequence is linear: totals, daily trend (optional), route fetch,
//! per-route sales, then a pure merge/sort step. Every store call is awaited
//! in order and timed; any failure aborts the whole run with no partial
//! result.

use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

use crate::aggregates;
use crate::db::DbConn;
use crate::models::{
    DateRange, Route, RouteSales, RouteSalesRow, ScenarioMode, ScenarioResult, StepTimings,
};

#[derive(Debug, Clone, Copy)]
pub struct ScenarioOptions {
    /// The daily trend step is a configuration flag, not a structural
    /// difference between modes.
    pub include_daily_trend: bool,
    pub route_limit: usize,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            include_daily_trend: true,
            route_limit: 50,
        }
    }
}

pub async fn run_scenario(
    db: &DbConn,
    mode: ScenarioMode,
    range: &DateRange,
    opts: &ScenarioOptions,
) -> Result<ScenarioResult> {
    let mut timings = StepTimings::default();

    // 1. Total sales and order count
    let (total_sales, total_orders, totals_secs) =
        aggregates::total_sales_and_orders(db, range).await?;
    timings.totals_secs = totals_secs;

    // 2. Daily trend
    let daily_trend = if opts.include_daily_trend {
        let (points, secs) = aggregates::daily_sales(db, range).await?;
        timings.daily_trend_secs = secs;
        points
    } else {
        Vec::new()
    };

    // 3. Longest routes from the graph (filter differs per mode)
    let optimized = mode == ScenarioMode::Optimized;
    let (routes, route_fetch_secs) =
        aggregates::longest_routes(db, opts.route_limit, optimized).await?;
    timings.route_fetch_secs = route_fetch_secs;

    // 4. Per-route sales: N individual queries vs one batch aggregation
    let (sales, route_sales_secs) = if optimized {
        aggregates::route_sales_batch(db, &routes, range).await?
    } else {
        aggregates::route_sales_individual(db, &routes, range).await?
    };
    timings.route_sales_secs = route_sales_secs;

    // 5. Merge, zero-fill, sort
    let route_sales = merge_route_sales(&routes, &sales);

    debug!(
        mode = mode.label(),
        total_secs = timings.total_secs(),
        routes = route_sales.len(),
        "scenario complete"
    );

    Ok(ScenarioResult {
        mode,
        total_sales,
        total_orders,
        daily_trend,
        route_sales,
        timings,
    })
}

/// Left-join the route list with per-route sales on (origin, destination).
/// Routes with no sales row get explicit zeros, never a missing entry. The
/// output is sorted descending by total_sales; the sort is stable, so ties
/// keep the route-list order.
pub fn merge_route_sales(routes: &[Route], sales: &[RouteSales]) -> Vec<RouteSalesRow> {
    let by_pair: HashMap<(&str, &str), &RouteSales> = sales
        .iter()
        .map(|s| ((s.origin.as_str(), s.destination.as_str()), s))
        .collect();

    let mut rows: Vec<RouteSalesRow> = routes
        .iter()
        .map(|route| {
            let hit = by_pair.get(&(route.origin.as_str(), route.destination.as_str()));
            RouteSalesRow {
                origin: route.origin.clone(),
                destination: route.destination.clone(),
                distance_km: route.distance_km,
                flight_time_hr: route.flight_time_hr,
                total_sales: hit.map(|s| s.total_sales).unwrap_or(0.0),
                total_orders: hit.map(|s| s.total_orders).unwrap_or(0),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_sales
            .partial_cmp(&a.total_sales)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}
