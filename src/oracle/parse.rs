//! Tolerant reading of oracle answers
//!
//! Models are asked for a bare JSON array but regularly wrap it in a Markdown
//! code fence, put a sentence in front of it, or return an object with a
//! `companies` key. All of those are accepted here.

use super::{CompanyRecord, OracleError};
use serde_json::Value;

/// Longest slice of a bad answer quoted in an error
const MAX_QUOTED_CHARS: usize = 200;

/// Narrows an answer down to the JSON it contains
///
/// Strips a surrounding code fence (with or without a language tag), then, if
/// prose remains around the payload, keeps the span from the first opening
/// bracket or brace to the last matching closer.
pub fn extract_json_payload(response: &str) -> &str {
    let trimmed = unfence(response.trim()).trim();

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return trimmed;
    }

    let first_array = trimmed.find('[');
    let first_object = trimmed.find('{');
    let (open_at, close) = match (first_array, first_object) {
        (Some(a), Some(o)) if o < a => (o, '}'),
        (Some(a), _) => (a, ']'),
        (None, Some(o)) => (o, '}'),
        (None, None) => return trimmed,
    };

    match trimmed.rfind(close) {
        Some(close_at) if close_at > open_at => &trimmed[open_at..=close_at],
        _ => trimmed,
    }
}

fn unfence(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };

    let after_ticks = &text[start + 3..];
    let body = match after_ticks.find('\n') {
        Some(newline) => &after_ticks[newline + 1..],
        None => after_ticks,
    };

    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Parses an oracle answer into records attributed to `source_url`
///
/// Accepts a JSON array of `{company_name, address}` objects or an object whose
/// `companies` key holds such an array. Entries that are not objects, or that
/// lack a non-empty name or address, are dropped.
///
/// # Returns
///
/// * `Ok(Vec<CompanyRecord>)` - Valid entries in answer order
/// * `Err(OracleError::Malformed)` - The answer holds no usable JSON
pub fn parse_company_records(
    response: &str,
    source_url: &str,
) -> Result<Vec<CompanyRecord>, OracleError> {
    let payload = extract_json_payload(response);

    let value: Value = serde_json::from_str(payload).map_err(|e| {
        OracleError::Malformed(format!("{} in '{}'", e, quote(response)))
    })?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("companies") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(OracleError::Malformed(format!(
                    "expected a JSON array of companies, got '{}'",
                    quote(response)
                )))
            }
        },
        _ => {
            return Err(OracleError::Malformed(format!(
                "expected a JSON array of companies, got '{}'",
                quote(response)
            )))
        }
    };

    let total = entries.len();
    let records: Vec<CompanyRecord> = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("company_name")?.as_str()?;
            let address = entry.get("address")?.as_str()?;
            CompanyRecord::new(name, address, source_url)
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            "Dropped {} incomplete entries from oracle answer for {}",
            total - records.len(),
            source_url
        );
    }

    Ok(records)
}

fn quote(text: &str) -> String {
    text.chars().take(MAX_QUOTED_CHARS).collect()
}
