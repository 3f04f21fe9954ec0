//! Business insights derived from a pair of scenario runs.
//!
//! Pure post-processing: no store access, no side effects. The baseline
//! result is passed in explicitly by the caller as the comparison context;
//! when it is absent the performance insight is simply skipped. All derived
//! ratios guard their denominators and yield 0 instead of failing.

use serde::Serialize;

use crate::models::{DailySalesPoint, ScenarioResult};

/// How many routes with nonzero sales the correlation insight requires.
const CORRELATION_MIN_ROUTES: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Performance,
    Sales,
    Trend,
    Route,
    Correlation,
    Recommendation,
}

/// One insight record for the presentation layer: a category tag, a title
/// and rendered text.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub content: String,
}

impl Insight {
    fn new(kind: InsightKind, title: &str, content: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            content,
        }
    }
}

/// Average order value; 0 when there are no orders.
pub fn average_order_value(total_sales: f64, total_orders: i64) -> f64 {
    if total_orders > 0 {
        total_sales / total_orders as f64
    } else {
        0.0
    }
}

/// Average sales per day; 0 when the period is empty or inverted.
pub fn average_daily_sales(total_sales: f64, period_days: i64) -> f64 {
    if period_days > 0 {
        total_sales / period_days as f64
    } else {
        0.0
    }
}

/// Pearson correlation coefficient; None when the series are too short or
/// either one has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Linear-interpolation quantile. Returns 0 for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// First point with the maximum daily_sales; earlier date wins ties.
fn peak_day(trend: &[DailySalesPoint]) -> Option<&DailySalesPoint> {
    let mut best: Option<&DailySalesPoint> = None;
    for point in trend {
        match best {
            Some(b) if point.daily_sales > b.daily_sales => best = Some(point),
            None => best = Some(point),
            _ => {}
        }
    }
    best
}

/// First point with the minimum daily_sales; earlier date wins ties.
fn trough_day(trend: &[DailySalesPoint]) -> Option<&DailySalesPoint> {
    let mut best: Option<&DailySalesPoint> = None;
    for point in trend {
        match best {
            Some(b) if point.daily_sales < b.daily_sales => best = Some(point),
            None => best = Some(point),
            _ => {}
        }
    }
    best
}

/// Generate insights from the optimized run, compared against the baseline
/// run when the caller supplies one.
pub fn generate_insights(
    baseline: Option<&ScenarioResult>,
    optimized: &ScenarioResult,
    period_days: i64,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    // 1. Performance impact, only when baseline timings are available
    if let Some(base) = baseline {
        let t_base = base.timings.total_secs();
        let t_opt = optimized.timings.total_secs();
        if t_base > 0.0 {
            let improvement = (t_base - t_opt) / t_base * 100.0;
            insights.push(Insight::new(
                InsightKind::Performance,
                "Performance Optimization Impact",
                format!(
                    "Optimization improves query performance by {improvement:.1}% \
                     from {t_base:.2}s to {t_opt:.2}s. Indexing and batch query \
                     processing account for the difference."
                ),
            ));
        }
    }

    // 2. Sales overview
    let avg_order = average_order_value(optimized.total_sales, optimized.total_orders);
    let avg_daily = average_daily_sales(optimized.total_sales, period_days);
    insights.push(Insight::new(
        InsightKind::Sales,
        "Sales Performance Overview",
        format!(
            "During {period_days} days, {} transactions occurred with total sales of Rp {:.0}. \
             Average order value: Rp {avg_order:.0}, average daily sales: Rp {avg_daily:.0}.",
            optimized.total_orders, optimized.total_sales
        ),
    ));

    // 3. Daily trend
    if let (Some(max_day), Some(min_day)) =
        (peak_day(&optimized.daily_trend), trough_day(&optimized.daily_trend))
    {
        insights.push(Insight::new(
            InsightKind::Trend,
            "Daily Sales Trend Analysis",
            format!(
                "Highest sales on {}: Rp {:.0}. Lowest sales on {}: Rp {:.0}.",
                max_day.date.format("%d %B %Y"),
                max_day.daily_sales,
                min_day.date.format("%d %B %Y"),
                min_day.daily_sales
            ),
        ));
    }

    // 4. Route performance: top 5 selling routes and their contribution
    let top_routes: Vec<_> = optimized
        .route_sales
        .iter()
        .filter(|r| r.total_sales > 0.0)
        .take(5)
        .collect();
    if let Some(top) = top_routes.first() {
        let top_sum: f64 = top_routes.iter().map(|r| r.total_sales).sum();
        let contribution = if optimized.total_sales > 0.0 {
            top_sum / optimized.total_sales * 100.0
        } else {
            0.0
        };
        insights.push(Insight::new(
            InsightKind::Route,
            "Route Performance Analysis",
            format!(
                "Best-selling route: {} to {} with sales of Rp {:.0} ({} orders). \
                 Top 5 routes contribute {contribution:.1}% of total sales.",
                top.origin, top.destination, top.total_sales, top.total_orders
            ),
        ));
    }

    // 5. Distance vs sales correlation over routes that actually sold
    let sold: Vec<_> = optimized
        .route_sales
        .iter()
        .filter(|r| r.total_sales > 0.0)
        .collect();
    if sold.len() >= CORRELATION_MIN_ROUTES {
        let distances: Vec<f64> = sold.iter().map(|r| r.distance_km).collect();
        let sales: Vec<f64> = sold.iter().map(|r| r.total_sales).collect();
        if let Some(r) = pearson(&distances, &sales) {
            let strength = if r.abs() < 0.3 {
                "weak"
            } else if r.abs() < 0.7 {
                "moderate"
            } else {
                "strong"
            };
            let direction = if r > 0.0 { "positive" } else { "negative" };
            let significant = if r.abs() > 0.3 { "has" } else { "does not have" };
            insights.push(Insight::new(
                InsightKind::Correlation,
                "Distance vs Sales Correlation",
                format!(
                    "Distance-sales correlation: {r:.3} ({strength} {direction}). \
                     Route distance {significant} significant impact on sales volume."
                ),
            ));
        }
    }

    // 6. Recommendations
    let mut recommendations = Vec::new();

    if !optimized.daily_trend.is_empty() {
        let daily: Vec<f64> = optimized.daily_trend.iter().map(|p| p.daily_sales).collect();
        let threshold = quantile(&daily, 0.25);
        let low_days = optimized
            .daily_trend
            .iter()
            .filter(|p| p.daily_sales <= threshold)
            .count();
        if low_days > 0 {
            recommendations.push(format!(
                "Focus marketing strategies on {low_days} low-sales days"
            ));
        }
    }

    let zero_sales_routes = optimized
        .route_sales
        .iter()
        .filter(|r| r.total_sales == 0.0)
        .count();
    if zero_sales_routes > 0 {
        recommendations.push(format!(
            "Evaluate and optimize {zero_sales_routes} routes with zero sales"
        ));
    }

    if !recommendations.is_empty() {
        insights.push(Insight::new(
            InsightKind::Recommendation,
            "Business Recommendations",
            format!("- {}", recommendations.join("\n- ")),
        ));
    }

    insights
}
