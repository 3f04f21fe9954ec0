//! Side-by-side comparison of the baseline and optimized analytics scenarios
//!
//! Drops the performance indexes, runs the baseline scenario (one query per
//! route), recreates the indexes, runs the optimized scenario (single batch
//! aggregation), then prints step timings, the merged route table head, and
//! the generated business insights. Results are saved as markdown under
//! results/.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use flight_sales::{
    config::Config,
    db,
    insights::generate_insights,
    models::{DateRange, ScenarioMode, ScenarioResult},
    scenario::{run_scenario, ScenarioOptions},
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(about = "Run the baseline and optimized analytics scenarios and compare them")]
struct Args {
    /// Database path (default: FLIGHTS_DB_PATH or data/flights.db)
    #[arg(long)]
    db: Option<String>,

    /// First day of the analysis window (default: FLIGHTS_START_DATE)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the analysis window (default: FLIGHTS_END_DATE)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Route limit for the longest-routes query
    #[arg(long, default_value = "50")]
    route_limit: usize,

    /// Skip the daily-trend step in both scenarios
    #[arg(long)]
    skip_daily_trend: bool,

    /// Do not write a markdown report under results/
    #[arg(long)]
    no_report: bool,
}

fn timing_rows(baseline: &ScenarioResult, optimized: &ScenarioResult) -> Vec<(String, f64, f64)> {
    let b = &baseline.timings;
    let o = &optimized.timings;
    vec![
        ("total_sales_and_orders".to_string(), b.totals_secs, o.totals_secs),
        ("daily_sales".to_string(), b.daily_trend_secs, o.daily_trend_secs),
        ("longest_routes".to_string(), b.route_fetch_secs, o.route_fetch_secs),
        ("route_sales".to_string(), b.route_sales_secs, o.route_sales_secs),
        ("TOTAL".to_string(), b.total_secs(), o.total_secs()),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let db_path = args.db.unwrap_or(config.db_path);
    let range = DateRange::new(
        args.start.unwrap_or(config.default_range.start),
        args.end.unwrap_or(config.default_range.end),
    );
    let opts = ScenarioOptions {
        include_daily_trend: !args.skip_daily_trend,
        route_limit: args.route_limit,
    };

    info!("Connecting to SurrealDB at {}", db_path);
    let db = db::connect(&db_path).await?;

    info!("\n========================================");
    info!("  Flight Sales Scenario Comparison");
    info!("  Window: {} .. {}", range.start, range.end);
    info!("========================================\n");

    info!("SCENARIO 1: baseline (indexes dropped, per-route queries)");
    db::drop_indexes(&db).await?;
    let baseline = run_scenario(&db, ScenarioMode::Baseline, &range, &opts).await?;
    info!(
        "  Total sales: {:.0}, orders: {}, time: {:.3}s",
        baseline.total_sales,
        baseline.total_orders,
        baseline.timings.total_secs()
    );

    info!("\nSCENARIO 2: optimized (indexes created, batch query)");
    db::create_indexes(&db).await?;
    let optimized = run_scenario(&db, ScenarioMode::Optimized, &range, &opts).await?;
    info!(
        "  Total sales: {:.0}, orders: {}, time: {:.3}s",
        optimized.total_sales,
        optimized.total_orders,
        optimized.timings.total_secs()
    );

    // Timing table
    println!("\n| Step | Baseline (s) | Optimized (s) |");
    println!("|------|--------------|---------------|");
    for (step, b, o) in timing_rows(&baseline, &optimized) {
        println!("| {} | {:.4} | {:.4} |", step, b, o);
    }

    // Top of the merged route table from the optimized run
    println!("\nTop routes by sales (optimized scenario):");
    for row in optimized.route_sales.iter().take(10) {
        println!(
            "  {} -> {}  distance {:7.0} km  sales {:10.0}  orders {:5}",
            row.origin, row.destination, row.distance_km, row.total_sales, row.total_orders
        );
    }

    // Insights
    let insights = generate_insights(Some(&baseline), &optimized, range.period_days());
    println!("\nInsights:");
    for insight in &insights {
        println!("\n  [{}]", insight.title);
        for line in insight.content.lines() {
            println!("  {}", line);
        }
    }

    if !args.no_report {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let results_file = format!("results/compare_{}.md", timestamp);

        std::fs::create_dir_all("results")?;

        let mut output = String::new();
        output.push_str("# Flight Sales Scenario Comparison\n\n");
        output.push_str(&format!(
            "**Date:** {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        output.push_str(&format!("**Database:** {}\n", db_path));
        output.push_str(&format!("**Window:** {} .. {}\n\n", range.start, range.end));

        output.push_str("## Step timings\n\n");
        output.push_str("| Step | Baseline (s) | Optimized (s) |\n");
        output.push_str("|------|--------------|---------------|\n");
        for (step, b, o) in timing_rows(&baseline, &optimized) {
            output.push_str(&format!("| {} | {:.4} | {:.4} |\n", step, b, o));
        }

        output.push_str("\n## Insights\n");
        for insight in &insights {
            output.push_str(&format!("\n### {}\n\n{}\n", insight.title, insight.content));
        }

        std::fs::write(&results_file, &output)?;
        info!("\nResults saved to: {}", results_file);
    }

    Ok(())
}
