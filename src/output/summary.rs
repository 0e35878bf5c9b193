//! Terminal summaries

use crate::output::{OutputError, OutputResult};
use crate::pipeline::PipelineReport;
use crate::storage::ResponseRecord;

/// Serializes a report as pretty-printed JSON
pub fn format_report_json(report: &PipelineReport) -> OutputResult<String> {
    serde_json::to_string_pretty(report).map_err(|e| OutputError::Format(e.to_string()))
}

/// Prints a human-readable summary of a report to stdout
pub fn print_report(report: &PipelineReport) {
    println!("=== SiteScout Results ===\n");

    println!("Overview:");
    println!("  Start URL: {}", report.start_url);
    println!("  Max depth: {}", report.max_depth);
    println!("  Pages crawled: {}", report.pages_crawled);
    println!("  Companies found: {}", report.companies_found);
    println!();

    if report.companies.is_empty() {
        return;
    }

    println!("Companies:");
    for (i, company) in report.companies.iter().enumerate() {
        println!("  {}. {}", i + 1, company.company_name);
        println!("     {}", company.address);
        println!("     source: {}", company.source_url);
    }
    println!();
}

/// Prints one line per stored response to stdout
pub fn print_responses(records: &[ResponseRecord]) {
    if records.is_empty() {
        println!("No stored responses.");
        return;
    }

    println!("=== Stored Responses ===\n");
    for record in records {
        let outcome = match record.report() {
            Some(report) => format!(
                "{} pages, {} companies",
                report.pages_crawled, report.companies_found
            ),
            None => record
                .events
                .last()
                .map(|event| event.message.clone())
                .unwrap_or_else(|| "no events".to_string()),
        };

        println!(
            "  #{} [{}] {} {} (depth {}, pages {}): {}",
            record.id,
            record.status.to_db_string(),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.request.start_url,
            record.request.max_depth,
            record.request.max_pages,
            outcome
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::CompanyRecord;

    #[test]
    fn test_format_report_json() {
        let report = PipelineReport {
            start_url: "https://example.com/".to_string(),
            pages_crawled: 1,
            companies_found: 1,
            max_depth: 0,
            companies: vec![CompanyRecord::new("Acme", "1 Road", "https://example.com/").unwrap()],
        };

        let json = format_report_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["companies_found"], 1);
        assert_eq!(value["companies"][0]["address"], "1 Road");
        assert!(json.contains('\n'));
    }
}
