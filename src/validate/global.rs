use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{ErrorCode, Level, Severity, ValidatedRow, ValidationError};

/// Outcome of the cross-row checks: the findings, plus the positions of rows
/// that must not reach the output (repeat duplicates and items with broken
/// hierarchies). Sequence findings never exclude anything.
#[derive(Debug, Default)]
pub struct GlobalReport {
    pub errors: Vec<ValidationError>,
    pub excluded: BTreeSet<usize>,
}

/// Runs the cross-row constraints over the full set of validated rows:
/// duplicate identifiers, hierarchy completeness for items, and contiguous
/// sibling numbering.
pub fn validate_entries(rows: &[ValidatedRow]) -> GlobalReport {
    let mut report = GlobalReport::default();
    check_duplicates(rows, &mut report);
    check_hierarchy(rows, &mut report);
    check_sequencing(rows, &mut report);
    report
}

fn check_duplicates(rows: &[ValidatedRow], report: &mut GlobalReport) {
    let mut seen: HashSet<&str> = HashSet::new();
    for (index, row) in rows.iter().enumerate() {
        let id = row.entry.id().as_str();
        if !seen.insert(id) {
            report.errors.push(
                ValidationError::new(
                    ErrorCode::DuplicateError,
                    Severity::Error,
                    format!("duplicate id '{id}'"),
                )
                .with_line(row.line)
                .with_row(&row.fields),
            );
            report.excluded.insert(index);
        }
    }
}

fn check_hierarchy(rows: &[ValidatedRow], report: &mut GlobalReport) {
    let ids: HashSet<&str> = rows.iter().map(|row| row.entry.id().as_str()).collect();

    for (index, row) in rows.iter().enumerate() {
        if row.entry.level() != Level::Item {
            continue;
        }

        let id = row.entry.id();
        let depth = id.depth();
        if !(2..=4).contains(&depth) {
            report.errors.push(
                ValidationError::new(
                    ErrorCode::HierarchyError,
                    Severity::Error,
                    format!("item '{id}' has invalid depth {depth} (expected 2, 3, or 4)"),
                )
                .with_line(row.line)
                .with_row(&row.fields),
            );
            report.excluded.insert(index);
            continue;
        }

        let missing: Vec<String> = id
            .ancestors()
            .filter(|ancestor| !ids.contains(ancestor))
            .map(|ancestor| {
                let level = Level::for_depth(ancestor.split('.').count())
                    .map(Level::as_str)
                    .unwrap_or("entry");
                format!("{level} '{ancestor}'")
            })
            .collect();

        if !missing.is_empty() {
            report.errors.push(
                ValidationError::new(
                    ErrorCode::HierarchyError,
                    Severity::Error,
                    format!("item '{id}' is missing ancestors: {}", missing.join(", ")),
                )
                .with_line(row.line)
                .with_row(&row.fields),
            );
            report.excluded.insert(index);
        }
    }
}

fn check_sequencing(rows: &[ValidatedRow], report: &mut GlobalReport) {
    let mut groups: BTreeMap<(usize, &str), Vec<&ValidatedRow>> = BTreeMap::new();
    for row in rows {
        let id = row.entry.id();
        let key = (id.depth(), id.parent_prefix().unwrap_or(""));
        groups.entry(key).or_default().push(row);
    }

    for mut members in groups.into_values() {
        members.sort_by_key(|row| row.entry.id().trailing_number());

        for (rank, row) in members.iter().enumerate() {
            let expected = rank as u64 + 1;
            let actual = row.entry.id().trailing_number();
            if actual != expected {
                report.errors.push(
                    ValidationError::new(
                        ErrorCode::SequenceError,
                        Severity::Warning,
                        format!(
                            "id '{}' breaks sibling numbering (expected trailing number \
                             {expected}, found {actual})",
                            row.entry.id()
                        ),
                    )
                    .with_line(row.line)
                    .with_row(&row.fields),
                );
            }
        }
    }
}
