use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::{ErrorCode, Row, Severity, ValidationError};

/// Normalizes a header or level value for comparison: Unicode NFD
/// decomposition, combining marks stripped, lowercased, and reduced to ASCII
/// alphanumerics. `%IVA` and `Descripción` become `iva` and `descripcion`.
pub fn slugify(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// The language a document's header row matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLanguage {
    Spanish,
    English,
}

/// The seven canonical fields every price list document must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Level,
    Id,
    Name,
    Description,
    Unit,
    IvaPercentage,
    Pvp,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Level,
        Field::Id,
        Field::Name,
        Field::Description,
        Field::Unit,
        Field::IvaPercentage,
        Field::Pvp,
    ];

    /// Slug the field's header must normalize to in the given language.
    fn slug(self, language: HeaderLanguage) -> &'static str {
        match (language, self) {
            (HeaderLanguage::Spanish, Field::Level) => "nivel",
            (HeaderLanguage::Spanish, Field::Id) => "id",
            (HeaderLanguage::Spanish, Field::Name) => "nombre",
            (HeaderLanguage::Spanish, Field::Description) => "descripcion",
            (HeaderLanguage::Spanish, Field::Unit) => "ud",
            (HeaderLanguage::Spanish, Field::IvaPercentage) => "iva",
            (HeaderLanguage::Spanish, Field::Pvp) => "pvp",
            (HeaderLanguage::English, Field::Level) => "level",
            (HeaderLanguage::English, Field::Id) => "id",
            (HeaderLanguage::English, Field::Name) => "name",
            (HeaderLanguage::English, Field::Description) => "description",
            (HeaderLanguage::English, Field::Unit) => "unit",
            (HeaderLanguage::English, Field::IvaPercentage) => "ivapercentage",
            (HeaderLanguage::English, Field::Pvp) => "pvp",
        }
    }

    /// Label used when citing the field in findings.
    pub fn label(self, language: HeaderLanguage) -> &'static str {
        match (language, self) {
            (HeaderLanguage::Spanish, Field::Level) => "NIVEL",
            (HeaderLanguage::Spanish, Field::Id) => "ID",
            (HeaderLanguage::Spanish, Field::Name) => "NOMBRE",
            (HeaderLanguage::Spanish, Field::Description) => "DESCRIPCION",
            (HeaderLanguage::Spanish, Field::Unit) => "UD",
            (HeaderLanguage::Spanish, Field::IvaPercentage) => "%IVA",
            (HeaderLanguage::Spanish, Field::Pvp) => "PVP",
            (HeaderLanguage::English, Field::Level) => "LEVEL",
            (HeaderLanguage::English, Field::Id) => "ID",
            (HeaderLanguage::English, Field::Name) => "NAME",
            (HeaderLanguage::English, Field::Description) => "DESCRIPTION",
            (HeaderLanguage::English, Field::Unit) => "UNIT",
            (HeaderLanguage::English, Field::IvaPercentage) => "IVA_PERCENTAGE",
            (HeaderLanguage::English, Field::Pvp) => "PVP",
        }
    }
}

const SPANISH_HEADERS: &str = "nivel, id, nombre, descripcion, ud, %iva, pvp";
const ENGLISH_HEADERS: &str = "level, id, name, description, unit, iva_percentage, pvp";

/// Resolved mapping from canonical field to column index, built once per
/// document from the header row. Column order is irrelevant and extra columns
/// are ignored; only a complete Spanish or complete English header set is
/// accepted.
#[derive(Debug, Clone)]
pub struct FieldMap {
    language: HeaderLanguage,
    columns: [usize; 7],
}

impl FieldMap {
    /// Builds the map from the document's first row, or returns the fatal
    /// structure finding when neither canonical set is fully present.
    pub fn from_header(header: &Row) -> Result<Self, ValidationError> {
        let slugs: Vec<String> = header.fields.iter().map(|field| slugify(field)).collect();

        for language in [HeaderLanguage::Spanish, HeaderLanguage::English] {
            if let Some(columns) = resolve_columns(&slugs, language) {
                return Ok(Self { language, columns });
            }
        }

        Err(ValidationError::new(
            ErrorCode::StructureError,
            Severity::Fatal,
            format!(
                "header row must contain either the fields {SPANISH_HEADERS} \
                 or the fields {ENGLISH_HEADERS}"
            ),
        )
        .with_line(header.line)
        .with_row(&header.fields))
    }

    /// The language the header matched.
    pub fn language(&self) -> HeaderLanguage {
        self.language
    }

    /// Label for citing a field in findings, in the matched language.
    pub fn label(&self, field: Field) -> &'static str {
        field.label(self.language)
    }

    /// Reads a field's raw value from a data row. Rows shorter than the
    /// header read as empty.
    pub fn value<'a>(&self, field: Field, fields: &'a [String]) -> &'a str {
        fields
            .get(self.columns[field as usize])
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn resolve_columns(slugs: &[String], language: HeaderLanguage) -> Option<[usize; 7]> {
    let mut columns = [0usize; 7];
    for field in Field::ALL {
        let slug = field.slug(language);
        let index = slugs.iter().position(|candidate| candidate == slug)?;
        columns[field as usize] = index;
    }
    Some(columns)
}
