//! End-of-run report
//!
//! Formats a [`ScrapeReport`] as the plain-text block printed after a scrape.

use crate::crawler::{CrawlOutcome, ScrapeReport};

/// Describes why the walk ended, in words
pub fn describe_outcome(outcome: CrawlOutcome) -> String {
    match outcome {
        CrawlOutcome::StopReached => "reached the requested stop page".to_string(),
        CrawlOutcome::LastPage(number) => format!("page {} is the last page", number),
        CrawlOutcome::Unreachable(number) => format!("could not fetch page {}", number),
        CrawlOutcome::Cancelled(number) => format!("cancelled before page {}", number),
    }
}

/// Formats a scrape report
pub fn format_report(report: &ScrapeReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Scrape of {} ===\n\n", report.identity));
    out.push_str(&format!("Run {}: {}\n", report.run_id, report.status.to_db_string()));
    out.push_str(&format!("Walk: {}\n", describe_outcome(report.crawl.outcome)));
    match report.crawl.last_page {
        Some(last) => out.push_str(&format!("Highest page reached: {}\n", last)),
        None => out.push_str("Highest page reached: none\n"),
    }
    out.push_str(&format!(
        "Pages fetched: {} (already resolved: {})\n",
        report.crawl.fetched, report.crawl.skipped
    ));
    out.push('\n');

    let download = &report.download;
    out.push_str("Images:\n");
    out.push_str(&format!("  Written: {}\n", download.written));
    out.push_str(&format!("  Already present: {}\n", download.already_present));
    out.push_str(&format!("  Skipped: {}\n", download.skipped));
    if download.failed > 0 {
        out.push_str(&format!("  Failed: {}\n", download.failed));
    }

    out
}

/// Prints a scrape report to stdout
pub fn print_report(report: &ScrapeReport) {
    print!("{}", format_report(report));
}
