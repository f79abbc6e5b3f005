use std::fmt;

use serde::{Deserialize, Serialize};

/// A tokenized CSV row: trimmed field values plus the 1-based line number the
/// row started on in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based source line number.
    pub line: usize,
    /// Field values in column order, trimmed of surrounding whitespace.
    pub fields: Vec<String>,
}

/// The four nesting levels of a price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Chapter,
    Subchapter,
    Section,
    Item,
}

impl Level {
    /// Resolves a slug-normalized level value from either vocabulary.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "capitulo" | "chapter" => Some(Level::Chapter),
            "subcapitulo" | "subchapter" => Some(Level::Subchapter),
            "seccion" | "section" => Some(Level::Section),
            "partida" | "item" => Some(Level::Item),
            _ => None,
        }
    }

    /// The level an id of the given depth is expected to sit at.
    pub fn for_depth(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(Level::Chapter),
            2 => Some(Level::Subchapter),
            3 => Some(Level::Section),
            4 => Some(Level::Item),
            _ => None,
        }
    }

    /// Canonical lowercase name used in the output vocabulary and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Chapter => "chapter",
            Level::Subchapter => "subchapter",
            Level::Section => "section",
            Level::Item => "item",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a price list entry: a dot-separated sequence of decimal
/// numbers such as `1.2.3`. The raw string is preserved verbatim for output
/// and duplicate detection; the parsed segments drive depth, ancestor, and
/// sibling-order logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryId {
    raw: String,
    segments: Vec<u64>,
}

impl EntryId {
    /// Parses an identifier, accepting only dot-separated runs of ASCII
    /// digits. Segments too large for `u64` stay format-valid and saturate
    /// for ordering purposes.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
                return None;
            }
            segments.push(segment.parse::<u64>().unwrap_or(u64::MAX));
        }
        Some(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The identifier exactly as it appeared in the source.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of dot-separated segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Numeric value of the final segment, used for sibling ordering.
    pub fn trailing_number(&self) -> u64 {
        self.segments.last().copied().unwrap_or(0)
    }

    /// The identifier with its final segment removed, or `None` for top-level
    /// entries.
    pub fn parent_prefix(&self) -> Option<&str> {
        self.raw.rfind('.').map(|index| &self.raw[..index])
    }

    /// All proper dot-prefixes of the identifier, shortest first. For
    /// `1.2.3.4` this yields `1`, `1.2`, and `1.2.3`.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.raw.match_indices('.').map(|(index, _)| &self.raw[..index])
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A data row that passed row-level validation, normalized into its level
/// variant. Container levels carry only the identifier and name; items carry
/// the full commercial payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEntry {
    Chapter {
        id: EntryId,
        name: String,
    },
    Subchapter {
        id: EntryId,
        name: String,
    },
    Section {
        id: EntryId,
        name: String,
    },
    Item {
        id: EntryId,
        name: String,
        description: String,
        unit: String,
        iva_percentage: f64,
        pvp: f64,
    },
}

impl ParsedEntry {
    /// The entry identifier, regardless of level.
    pub fn id(&self) -> &EntryId {
        match self {
            ParsedEntry::Chapter { id, .. }
            | ParsedEntry::Subchapter { id, .. }
            | ParsedEntry::Section { id, .. }
            | ParsedEntry::Item { id, .. } => id,
        }
    }

    /// The level this entry was declared at.
    pub fn level(&self) -> Level {
        match self {
            ParsedEntry::Chapter { .. } => Level::Chapter,
            ParsedEntry::Subchapter { .. } => Level::Subchapter,
            ParsedEntry::Section { .. } => Level::Section,
            ParsedEntry::Item { .. } => Level::Item,
        }
    }
}

/// A validated entry together with its provenance, retained so cross-row
/// findings can cite the offending source row.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    /// 1-based source line number.
    pub line: usize,
    /// The raw field values of the originating row.
    pub fields: Vec<String>,
    /// The normalized entry.
    pub entry: ParsedEntry,
}

/// How severe a finding is and whether it stops the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Aborts the pipeline; later stages never run.
    Fatal,
    /// The affected row is excluded; the pipeline continues.
    Error,
    /// Surfaced for caller visibility; never blocks success.
    Warning,
}

/// Machine-readable classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ParseError,
    StructureError,
    ValidationError,
    HierarchyError,
    DuplicateError,
    SequenceError,
}

/// A single finding produced by any pipeline stage. Findings are accumulated
/// into the result envelope and never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub code: ErrorCode,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_row: Option<Vec<String>>,
    pub message: String,
}

impl ValidationError {
    /// Creates a finding with no source location attached.
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            line: None,
            field: None,
            original_row: None,
            message: message.into(),
        }
    }

    /// Attaches the 1-based source line number.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches the field label the finding refers to.
    pub fn with_field(mut self, label: impl Into<String>) -> Self {
        self.field = Some(label.into());
        self
    }

    /// Attaches a copy of the offending row's raw fields.
    pub fn with_row(mut self, fields: &[String]) -> Self {
        self.original_row = Some(fields.to_vec());
        self
    }
}

/// A canonical output entry, tagged by its level name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum Entry {
    Chapter {
        id: String,
        name: String,
    },
    Subchapter {
        id: String,
        name: String,
    },
    Section {
        id: String,
        name: String,
    },
    Item {
        id: String,
        name: String,
        description: String,
        unit: String,
        #[serde(rename = "ivaPercentage")]
        iva_percentage: String,
        pvp: String,
    },
}

impl Entry {
    /// The entry identifier, regardless of level.
    pub fn id(&self) -> &str {
        match self {
            Entry::Chapter { id, .. }
            | Entry::Subchapter { id, .. }
            | Entry::Section { id, .. }
            | Entry::Item { id, .. } => id,
        }
    }
}

/// The envelope handed back to the caller: transformed entries when the
/// pipeline reached the end, plus every finding accumulated along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Entry>>,
    pub errors: Vec<ValidationError>,
}

impl Conversion {
    /// A terminal failure carrying the findings collected so far.
    pub fn failed(errors: Vec<ValidationError>) -> Self {
        Self {
            success: false,
            data: None,
            errors,
        }
    }

    /// A successful conversion with its entries and non-fatal findings.
    pub fn succeeded(data: Vec<Entry>, errors: Vec<ValidationError>) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors,
        }
    }
}
