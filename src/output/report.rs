//! Plain-text reporting for run results and crawl state
//!
//! This module prints operator-facing summaries of finished runs, run
//! history, and persisted watermarks.

use crate::run::RunResult;
use crate::storage::RunRecord;

/// Prints a run result to stdout in a formatted manner
pub fn print_run_report(scraper: &str, result: &RunResult) {
    println!("=== Run Report: {} ===\n", scraper);

    println!("Status: {}", result.status);
    println!();

    println!("Counters:");
    println!("  Scraped:    {}", result.scraped_count);
    println!("  Downloaded: {}", result.downloaded_count);
    println!("  Skipped:    {}", result.skipped_count);
    println!("  Excluded:   {}", result.excluded_count);
    println!("  Failed:     {}", result.failed_count);

    if !result.excluded.is_empty() {
        println!("\nExcluded Documents ({}):", result.excluded.len());
        for doc in &result.excluded {
            let title = doc.title.as_deref().unwrap_or("(untitled)");
            println!("  - {} [{}]", title, doc.reason);
            println!("    {}", doc.url);
        }
    }

    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        for error in &result.errors {
            println!("  - {}", error);
        }
    }

    // Share of listed items that made it into the corpus
    let download_rate = if result.scraped_count > 0 {
        (result.downloaded_count as f64 / result.scraped_count as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "\nDownload Rate: {:.1}% ({} / {} items)",
        download_rate, result.downloaded_count, result.scraped_count
    );
}

/// Prints recent run history, newest first
pub fn print_run_history(runs: &[RunRecord]) {
    if runs.is_empty() {
        println!("No recorded runs.");
        return;
    }

    println!("Recent Runs:");
    for run in runs {
        println!(
            "  [{}] {} {}: {} scraped, {} downloaded, {} skipped, {} excluded, {} failed{}",
            run.finished_at,
            run.scraper,
            run.status,
            run.scraped_count,
            run.downloaded_count,
            run.skipped_count,
            run.excluded_count,
            run.failed_count,
            if run.errors.is_empty() {
                String::new()
            } else {
                format!(", {} errors", run.errors.len())
            }
        );
    }
}

/// Prints persisted watermarks per scraper
pub fn print_watermarks(watermarks: &[(String, String)]) {
    if watermarks.is_empty() {
        println!("No watermarks recorded (next runs will crawl everything).");
        return;
    }

    println!("Watermarks:");
    for (scraper, date) in watermarks {
        println!("  {}: {}", scraper, date);
    }
}
