use crate::model::{Entry, ParsedEntry};

/// Maps a validated entry into the canonical output shape. Identifiers and
/// names are preserved verbatim; item money and VAT values are rendered as
/// fixed-point strings with exactly two decimals, and an empty description
/// becomes a single space so downstream templates always have a value.
pub fn transform(entry: &ParsedEntry) -> Entry {
    match entry {
        ParsedEntry::Chapter { id, name } => Entry::Chapter {
            id: id.to_string(),
            name: name.clone(),
        },
        ParsedEntry::Subchapter { id, name } => Entry::Subchapter {
            id: id.to_string(),
            name: name.clone(),
        },
        ParsedEntry::Section { id, name } => Entry::Section {
            id: id.to_string(),
            name: name.clone(),
        },
        ParsedEntry::Item {
            id,
            name,
            description,
            unit,
            iva_percentage,
            pvp,
        } => Entry::Item {
            id: id.to_string(),
            name: name.clone(),
            description: if description.is_empty() {
                " ".to_string()
            } else {
                description.clone()
            },
            unit: unit.clone(),
            iva_percentage: format_fixed(*iva_percentage),
            pvp: format_fixed(*pvp),
        },
    }
}

fn format_fixed(value: f64) -> String {
    format!("{value:.2}")
}
