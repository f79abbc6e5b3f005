use crate::header::{Field, FieldMap, slugify};
use crate::model::{
    EntryId, ErrorCode, Level, ParsedEntry, Row, Severity, ValidatedRow, ValidationError,
};

/// Validates a single data row against its level's rules.
///
/// Container rows (chapter, subchapter, section) require an id and a name;
/// item rows additionally require a unit, a VAT percentage in [0, 100], and a
/// non-negative retail price. A row with any finding is rejected whole: the
/// findings are returned and the row takes no further part in the pipeline.
pub fn validate_row(row: &Row, map: &FieldMap) -> Result<ValidatedRow, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut reject = |field: Field, message: String| {
        errors.push(
            ValidationError::new(ErrorCode::ValidationError, Severity::Error, message)
                .with_line(row.line)
                .with_field(map.label(field))
                .with_row(&row.fields),
        );
    };

    let level_raw = map.value(Field::Level, &row.fields);
    let level = Level::from_slug(&slugify(level_raw));
    if level.is_none() {
        reject(Field::Level, format!("invalid level value '{level_raw}'"));
    }

    let id_raw = map.value(Field::Id, &row.fields);
    let id = if id_raw.is_empty() {
        reject(Field::Id, "missing required field".to_string());
        None
    } else {
        let parsed = EntryId::parse(id_raw);
        if parsed.is_none() {
            reject(
                Field::Id,
                format!("id '{id_raw}' is not a dot-separated sequence of numbers"),
            );
        }
        parsed
    };

    let name = map.value(Field::Name, &row.fields);
    if name.is_empty() {
        reject(Field::Name, "missing required field".to_string());
    }

    let mut iva_percentage = 0.0;
    let mut pvp = 0.0;
    if level == Some(Level::Item) {
        let unit = map.value(Field::Unit, &row.fields);
        if unit.is_empty() {
            reject(Field::Unit, "missing required field".to_string());
        }

        match checked_number(map.value(Field::IvaPercentage, &row.fields)) {
            CheckedNumber::Missing => {
                reject(Field::IvaPercentage, "missing required field".to_string());
            }
            CheckedNumber::Invalid(value) => {
                reject(Field::IvaPercentage, format!("'{value}' is not a number"));
            }
            CheckedNumber::Value(value) if !(0.0..=100.0).contains(&value) => {
                reject(
                    Field::IvaPercentage,
                    format!("'{value}' must be between 0 and 100"),
                );
            }
            CheckedNumber::Value(value) => iva_percentage = value,
        }

        match checked_number(map.value(Field::Pvp, &row.fields)) {
            CheckedNumber::Missing => {
                reject(Field::Pvp, "missing required field".to_string());
            }
            CheckedNumber::Invalid(value) => {
                reject(Field::Pvp, format!("'{value}' is not a number"));
            }
            CheckedNumber::Value(value) if value < 0.0 => {
                reject(Field::Pvp, format!("'{value}' must not be negative"));
            }
            CheckedNumber::Value(value) => pvp = value,
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Both checked above; a row without them never reaches this point.
    let (Some(level), Some(id)) = (level, id) else {
        return Err(errors);
    };

    let name = name.to_string();
    let entry = match level {
        Level::Chapter => ParsedEntry::Chapter { id, name },
        Level::Subchapter => ParsedEntry::Subchapter { id, name },
        Level::Section => ParsedEntry::Section { id, name },
        Level::Item => ParsedEntry::Item {
            id,
            name,
            description: map.value(Field::Description, &row.fields).to_string(),
            unit: map.value(Field::Unit, &row.fields).to_string(),
            iva_percentage,
            pvp,
        },
    };

    Ok(ValidatedRow {
        line: row.line,
        fields: row.fields.clone(),
        entry,
    })
}

enum CheckedNumber {
    Missing,
    Invalid(String),
    Value(f64),
}

/// Parses a decimal that may use either `.` or `,` as separator; the comma is
/// normalized away before parsing.
fn checked_number(raw: &str) -> CheckedNumber {
    if raw.is_empty() {
        return CheckedNumber::Missing;
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => CheckedNumber::Value(value),
        _ => CheckedNumber::Invalid(raw.to_string()),
    }
}
