use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::header::FieldMap;
use crate::model::{Conversion, ErrorCode, Severity, ValidationError};
use crate::tokenize::tokenize;
use crate::transform::transform;
use crate::validate::{validate_entries, validate_row};

/// Runs the full conversion pipeline over a CSV document.
///
/// Stages run strictly in order: tokenize, map the header, validate rows,
/// check cross-row constraints, transform. A fatal finding at any stage stops
/// the pipeline and returns the findings collected up to that point; on
/// success the envelope carries the transformed entries alongside every
/// non-fatal finding.
///
/// The function holds no state between calls and performs no I/O, so
/// independent inputs may be converted concurrently.
#[instrument(level = "info", skip_all, fields(bytes = input.len()))]
pub fn convert(input: &str) -> Conversion {
    let rows = tokenize(input);
    let Some((header, data_rows)) = rows.split_first() else {
        return Conversion::failed(vec![ValidationError::new(
            ErrorCode::ParseError,
            Severity::Fatal,
            "CSV input is empty or contains no usable rows",
        )]);
    };
    debug!(row_count = rows.len(), "tokenized input");

    let map = match FieldMap::from_header(header) {
        Ok(map) => map,
        Err(error) => return Conversion::failed(vec![error]),
    };

    let mut errors = Vec::new();
    let mut valid = Vec::new();
    for row in data_rows {
        match validate_row(row, &map) {
            Ok(validated) => valid.push(validated),
            Err(row_errors) => errors.extend(row_errors),
        }
    }
    info!(
        valid = valid.len(),
        rejected = data_rows.len() - valid.len(),
        "row validation finished"
    );

    if valid.is_empty() {
        if errors.is_empty() {
            errors.push(ValidationError::new(
                ErrorCode::ParseError,
                Severity::Fatal,
                "CSV contains no data rows",
            ));
        }
        return Conversion::failed(errors);
    }

    let report = validate_entries(&valid);
    debug!(
        findings = report.errors.len(),
        excluded = report.excluded.len(),
        "cross-row validation finished"
    );
    errors.extend(report.errors);

    let data = valid
        .iter()
        .enumerate()
        .filter(|(index, _)| !report.excluded.contains(index))
        .map(|(_, row)| transform(&row.entry))
        .collect();

    Conversion::succeeded(data, errors)
}

/// Converts a CSV file on disk and writes the pretty-printed JSON envelope.
/// Returns the envelope so callers can inspect the outcome.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn convert_file(input: &Path, output: &Path) -> Result<Conversion> {
    let source = fs::read_to_string(input)?;
    let conversion = convert(&source);
    info!(
        success = conversion.success,
        findings = conversion.errors.len(),
        "conversion finished"
    );
    let json = serde_json::to_string_pretty(&conversion)?;
    fs::write(output, json)?;
    Ok(conversion)
}
