//! Aggregation queries against the order store and the route graph.
//!
//! Every function returns its payload together with the elapsed wall-clock
//! seconds of the store round-trip(s), measured around the query calls only.
//! Store failures propagate immediately; empty results are not failures and
//! come back as zeros or empty vectors.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use crate::db::DbConn;
use crate::models::{DailySalesPoint, DateRange, Route, RouteSales};

#[derive(Debug, Deserialize)]
struct TotalsRow {
    total_sales: f64,
    total_orders: i64,
}

#[derive(Debug, Deserialize)]
struct DailyRow {
    day: String,
    daily_sales: f64,
    daily_orders: i64,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    origin: String,
    destination: String,
    distance_km: f64,
    flight_time_hr: Option<f64>,
}

/// Sum of total_price and order count over the inclusive date range.
/// Returns `(0.0, 0, t)` when no orders match.
pub async fn total_sales_and_orders(db: &DbConn, range: &DateRange) -> Result<(f64, i64, f64)> {
    let started = Instant::now();
    let rows: Vec<TotalsRow> = db
        .query(
            r#"
            SELECT
                math::sum(total_price) AS total_sales,
                count() AS total_orders
            FROM orders
            WHERE depart_date >= <datetime>$start AND depart_date <= <datetime>$end
            GROUP ALL
            "#,
        )
        .bind(("start", range.start_bound()))
        .bind(("end", range.end_bound()))
        .await?
        .take(0)?;
    let elapsed = started.elapsed().as_secs_f64();

    let (total_sales, total_orders) = rows
        .into_iter()
        .next()
        .map(|r| (r.total_sales, r.total_orders))
        .unwrap_or((0.0, 0));

    debug!(total_sales, total_orders, elapsed, "totals query");
    Ok((total_sales, total_orders, elapsed))
}

/// Per-day sales over the range, ascending by date. Days without orders are
/// absent from the result, never zero-filled.
pub async fn daily_sales(db: &DbConn, range: &DateRange) -> Result<(Vec<DailySalesPoint>, f64)> {
    let started = Instant::now();
    let rows: Vec<DailyRow> = db
        .query(
            r#"
            SELECT
                time::format(depart_date, "%Y-%m-%d") AS day,
                math::sum(total_price) AS daily_sales,
                count() AS daily_orders
            FROM orders
            WHERE depart_date >= <datetime>$start AND depart_date <= <datetime>$end
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(("start", range.start_bound()))
        .bind(("end", range.end_bound()))
        .await?
        .take(0)?;
    let elapsed = started.elapsed().as_secs_f64();

    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let date = NaiveDate::parse_from_str(&row.day, "%Y-%m-%d")?;
        points.push(DailySalesPoint {
            date,
            daily_sales: row.daily_sales,
            daily_orders: row.daily_orders,
        });
    }

    Ok((points, elapsed))
}

/// Up to `limit` route edges ordered by distance descending.
///
/// The optimized variant restricts the traversal to edges with
/// `distance_km > 1000` and a known flight time, so the two modes can return
/// different route sets, not just different timings.
pub async fn longest_routes(
    db: &DbConn,
    limit: usize,
    optimized: bool,
) -> Result<(Vec<Route>, f64)> {
    let sql = if optimized {
        format!(
            r#"
            SELECT in.code AS origin, out.code AS destination, distance_km, flight_time_hr
            FROM connected_to
            WHERE distance_km > 1000 AND flight_time_hr != NONE
            ORDER BY distance_km DESC
            LIMIT {limit}
            "#
        )
    } else {
        format!(
            r#"
            SELECT in.code AS origin, out.code AS destination, distance_km, flight_time_hr
            FROM connected_to
            ORDER BY distance_km DESC
            LIMIT {limit}
            "#
        )
    };

    let started = Instant::now();
    let rows: Vec<RouteRow> = db.query(sql).await?.take(0)?;
    let elapsed = started.elapsed().as_secs_f64();

    let routes = rows
        .into_iter()
        .map(|r| Route {
            origin: r.origin,
            destination: r.destination,
            distance_km: r.distance_km,
            flight_time_hr: r.flight_time_hr,
        })
        .collect();

    Ok((routes, elapsed))
}

/// Per-route sales via one aggregation per route: N sequential round-trips.
/// Deliberately naive baseline; routes with no orders come back as zero rows.
pub async fn route_sales_individual(
    db: &DbConn,
    routes: &[Route],
    range: &DateRange,
) -> Result<(Vec<RouteSales>, f64)> {
    let started = Instant::now();
    let mut sales = Vec::with_capacity(routes.len());

    for route in routes {
        let rows: Vec<TotalsRow> = db
            .query(
                r#"
                SELECT
                    math::sum(total_price) AS total_sales,
                    count() AS total_orders
                FROM orders
                WHERE origin = $origin AND destination = $destination
                  AND depart_date >= <datetime>$start AND depart_date <= <datetime>$end
                GROUP ALL
                "#,
            )
            .bind(("origin", route.origin.clone()))
            .bind(("destination", route.destination.clone()))
            .bind(("start", range.start_bound()))
            .bind(("end", range.end_bound()))
            .await?
            .take(0)?;

        let (total_sales, total_orders) = rows
            .into_iter()
            .next()
            .map(|r| (r.total_sales, r.total_orders))
            .unwrap_or((0.0, 0));

        sales.push(RouteSales {
            origin: route.origin.clone(),
            destination: route.destination.clone(),
            total_sales,
            total_orders,
        });
    }

    Ok((sales, started.elapsed().as_secs_f64()))
}

/// Per-route sales via a single set-membership aggregation grouped by
/// (origin, destination), re-joined onto the route list so unsold routes
/// still appear with zeros. Functionally equivalent to
/// [`route_sales_individual`]; only the call pattern differs.
pub async fn route_sales_batch(
    db: &DbConn,
    routes: &[Route],
    range: &DateRange,
) -> Result<(Vec<RouteSales>, f64)> {
    let started = Instant::now();

    let mut origins: Vec<String> = routes.iter().map(|r| r.origin.clone()).collect();
    origins.sort();
    origins.dedup();
    let mut destinations: Vec<String> = routes.iter().map(|r| r.destination.clone()).collect();
    destinations.sort();
    destinations.dedup();

    let rows: Vec<RouteSales> = db
        .query(
            r#"
            SELECT
                origin,
                destination,
                math::sum(total_price) AS total_sales,
                count() AS total_orders
            FROM orders
            WHERE depart_date >= <datetime>$start AND depart_date <= <datetime>$end
              AND origin IN $origins AND destination IN $destinations
            GROUP BY origin, destination
            "#,
        )
        .bind(("start", range.start_bound()))
        .bind(("end", range.end_bound()))
        .bind(("origins", origins))
        .bind(("destinations", destinations))
        .await?
        .take(0)?;
    let elapsed = started.elapsed().as_secs_f64();

    // The IN filters match the cross product of origins and destinations, so
    // the grouped rows can contain pairs that are not actual routes. Joining
    // back onto the route list drops those and zero-fills unsold routes.
    let by_pair: HashMap<(&str, &str), &RouteSales> = rows
        .iter()
        .map(|r| ((r.origin.as_str(), r.destination.as_str()), r))
        .collect();

    let sales = routes
        .iter()
        .map(|route| {
            let hit = by_pair.get(&(route.origin.as_str(), route.destination.as_str()));
            RouteSales {
                origin: route.origin.clone(),
                destination: route.destination.clone(),
                total_sales: hit.map(|s| s.total_sales).unwrap_or(0.0),
                total_orders: hit.map(|s| s.total_orders).unwrap_or(0),
            }
        })
        .collect();

    Ok((sales, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn test_db() -> DbConn {
        let conn = db::connect_memory().await.unwrap();
        db::init_schema(&conn).await.unwrap();
        conn
    }

    async fn add_airport(db: &DbConn, code: &str) {
        db.query("CREATE type::thing('airport', $code) SET code = $code")
            .bind(("code", code.to_string()))
            .await
            .unwrap()
            .check()
            .unwrap();
    }

    async fn add_route(
        db: &DbConn,
        origin: &str,
        destination: &str,
        distance_km: f64,
        flight_time_hr: Option<f64>,
    ) {
        db.query(
            r#"
            RELATE (type::thing('airport', $origin))->connected_to->(type::thing('airport', $destination))
            SET distance_km = $distance_km, flight_time_hr = $flight_time_hr
            "#,
        )
        .bind(("origin", origin.to_string()))
        .bind(("destination", destination.to_string()))
        .bind(("distance_km", distance_km))
        .bind(("flight_time_hr", flight_time_hr))
        .await
        .unwrap()
        .check()
        .unwrap();
    }

    async fn add_order(db: &DbConn, origin: &str, destination: &str, day: &str, price: f64) {
        db.query(
            r#"
            CREATE orders CONTENT {
                order_id: rand::string(8),
                passenger: "test",
                origin: $origin,
                destination: $destination,
                depart_date: <datetime>$depart_date,
                total_price: $total_price
            }
            "#,
        )
        .bind(("origin", origin.to_string()))
        .bind(("destination", destination.to_string()))
        .bind(("depart_date", format!("{day}T12:00:00Z")))
        .bind(("total_price", price))
        .await
        .unwrap()
        .check()
        .unwrap();
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(start.parse().unwrap(), end.parse().unwrap())
    }

    #[tokio::test]
    async fn totals_are_zero_for_empty_range() {
        let db = test_db().await;
        add_order(&db, "CGK", "DPS", "2023-03-10", 50.0).await;

        let (sales, orders, elapsed) =
            total_sales_and_orders(&db, &range("2024-01-01", "2024-01-31"))
                .await
                .unwrap();
        assert_eq!(sales, 0.0);
        assert_eq!(orders, 0);
        assert!(elapsed >= 0.0);
    }

    #[tokio::test]
    async fn single_day_example_totals_and_trend() {
        let db = test_db().await;
        add_airport(&db, "CGK").await;
        add_airport(&db, "DPS").await;
        add_route(&db, "CGK", "DPS", 983.0, Some(1.9)).await;
        add_order(&db, "CGK", "DPS", "2023-03-10", 50.0).await;
        add_order(&db, "CGK", "DPS", "2023-03-10", 70.0).await;

        let day = range("2023-03-10", "2023-03-10");

        let (sales, orders, _) = total_sales_and_orders(&db, &day).await.unwrap();
        assert_eq!(sales, 120.0);
        assert_eq!(orders, 2);

        let (trend, _) = daily_sales(&db, &day).await.unwrap();
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].date, "2023-03-10".parse().unwrap());
        assert_eq!(trend[0].daily_sales, 120.0);
        assert_eq!(trend[0].daily_orders, 2);

        let routes = vec![Route {
            origin: "CGK".into(),
            destination: "DPS".into(),
            distance_km: 983.0,
            flight_time_hr: Some(1.9),
        }];
        let (batch, _) = route_sales_batch(&db, &routes, &day).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].total_sales, 120.0);
        assert_eq!(batch[0].total_orders, 2);
    }

    #[tokio::test]
    async fn daily_trend_is_sparse_and_ascending() {
        let db = test_db().await;
        add_order(&db, "CGK", "DPS", "2023-03-14", 90.0).await;
        add_order(&db, "CGK", "DPS", "2023-03-10", 50.0).await;
        // 2023-03-11 .. 2023-03-13 have no orders and must be absent.
        add_order(&db, "CGK", "SUB", "2023-03-10", 30.0).await;

        let (trend, _) = daily_sales(&db, &range("2023-03-01", "2023-03-31"))
            .await
            .unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, "2023-03-10".parse().unwrap());
        assert_eq!(trend[0].daily_sales, 80.0);
        assert_eq!(trend[0].daily_orders, 2);
        assert_eq!(trend[1].date, "2023-03-14".parse().unwrap());
        assert_eq!(trend[1].daily_sales, 90.0);
    }

    async fn route_fixture(db: &DbConn) {
        for code in ["CGK", "DPS", "SUB", "KNO"] {
            add_airport(db, code).await;
        }
        add_route(db, "SUB", "KNO", 2050.0, Some(2.8)).await;
        add_route(db, "CGK", "KNO", 1404.0, Some(2.2)).await;
        add_route(db, "CGK", "DPS", 983.0, Some(1.9)).await;
        add_route(db, "DPS", "SUB", 310.0, None).await;
        add_route(db, "KNO", "DPS", 2190.0, None).await;
    }

    #[tokio::test]
    async fn longest_routes_orders_by_distance_and_respects_limit() {
        let db = test_db().await;
        route_fixture(&db).await;

        let (routes, elapsed) = longest_routes(&db, 3, false).await.unwrap();
        assert!(elapsed >= 0.0);
        let distances: Vec<f64> = routes.iter().map(|r| r.distance_km).collect();
        assert_eq!(distances, vec![2190.0, 2050.0, 1404.0]);
    }

    #[tokio::test]
    async fn optimized_route_query_diverges_from_baseline() {
        let db = test_db().await;
        route_fixture(&db).await;

        let (baseline, _) = longest_routes(&db, 50, false).await.unwrap();
        assert_eq!(baseline.len(), 5);
        assert!(baseline.iter().any(|r| r.distance_km == 983.0));

        // distance <= 1000 and unknown flight times drop out.
        let (optimized, _) = longest_routes(&db, 50, true).await.unwrap();
        let pairs: Vec<(&str, &str)> = optimized
            .iter()
            .map(|r| (r.origin.as_str(), r.destination.as_str()))
            .collect();
        assert_eq!(pairs, vec![("SUB", "KNO"), ("CGK", "KNO")]);
    }

    #[tokio::test]
    async fn batch_and_individual_route_sales_agree() {
        let db = test_db().await;
        route_fixture(&db).await;
        add_order(&db, "CGK", "DPS", "2023-03-10", 50.0).await;
        add_order(&db, "CGK", "DPS", "2023-03-12", 70.0).await;
        add_order(&db, "SUB", "KNO", "2023-03-11", 200.0).await;
        // Cross-product pair that is not an actual route: must not leak in.
        add_order(&db, "CGK", "SUB", "2023-03-11", 999.0).await;
        // Outside the analysis window.
        add_order(&db, "CGK", "DPS", "2023-05-01", 1000.0).await;

        let window = range("2023-03-01", "2023-03-31");
        let (routes, _) = longest_routes(&db, 50, false).await.unwrap();

        let (individual, _) = route_sales_individual(&db, &routes, &window).await.unwrap();
        let (batch, _) = route_sales_batch(&db, &routes, &window).await.unwrap();

        assert_eq!(individual.len(), routes.len());
        let mut a = individual.clone();
        let mut b = batch.clone();
        let key = |s: &RouteSales| (s.origin.clone(), s.destination.clone());
        a.sort_by_key(key);
        b.sort_by_key(key);
        assert_eq!(a, b);

        let cgk_dps = individual
            .iter()
            .find(|s| s.origin == "CGK" && s.destination == "DPS")
            .unwrap();
        assert_eq!(cgk_dps.total_sales, 120.0);
        assert_eq!(cgk_dps.total_orders, 2);

        // Unsold route comes back as an explicit zero row in both variants.
        let dps_sub = batch
            .iter()
            .find(|s| s.origin == "DPS" && s.destination == "SUB")
            .unwrap();
        assert_eq!(dps_sub.total_sales, 0.0);
        assert_eq!(dps_sub.total_orders, 0);
    }
}
