//! Markdown report generation
//!
//! This module renders a finished pipeline run as a Markdown document: the run
//! facts followed by a table of the companies found.

use crate::output::OutputResult;
use crate::pipeline::PipelineReport;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a Markdown report to a file
///
/// # Arguments
///
/// * `report` - The finished pipeline report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the file
pub fn write_report_markdown(report: &PipelineReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_report_markdown(report, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote report to {}", output_path.display());
    Ok(())
}

/// Formats a pipeline report as Markdown
///
/// # Arguments
///
/// * `report` - The finished pipeline report
/// * `generated_at` - Timestamp printed in the header
pub fn format_report_markdown(report: &PipelineReport, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str("# SiteScout Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", report.start_url));
    md.push_str(&format!("- **Max Depth**: {}\n", report.max_depth));
    md.push_str(&format!("- **Pages Crawled**: {}\n", report.pages_crawled));
    md.push_str(&format!(
        "- **Companies Found**: {}\n",
        report.companies_found
    ));
    md.push_str(&format!(
        "- **Generated**: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Companies\n\n");
    if report.companies.is_empty() {
        md.push_str("No companies with a name and address were found.\n");
        return md;
    }

    md.push_str("| # | Company | Address | Source |\n");
    md.push_str("|---|---------|---------|--------|\n");
    for (i, company) in report.companies.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            escape_cell(&company.company_name),
            escape_cell(&company.address),
            escape_cell(&company.source_url)
        ));
    }

    md
}

/// Keeps a value inside one table cell
fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
