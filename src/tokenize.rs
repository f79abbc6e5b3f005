use crate::model::Row;

/// Delimiters considered by [`detect_delimiter`], in precedence order.
const DELIMITER_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Picks the delimiter by counting candidate occurrences in the first line.
/// The highest count wins; a tie or an all-zero count falls back to a comma.
pub fn detect_delimiter(input: &str) -> char {
    let first_line = input.lines().next().unwrap_or("");
    let counts =
        DELIMITER_CANDIDATES.map(|candidate| first_line.matches(candidate).count());

    let best = counts.iter().copied().max().unwrap_or(0);
    if best == 0 || counts.iter().filter(|&&count| count == best).count() > 1 {
        return ',';
    }

    DELIMITER_CANDIDATES
        .iter()
        .zip(counts)
        .find(|(_, count)| *count == best)
        .map(|(candidate, _)| *candidate)
        .unwrap_or(',')
}

enum State {
    Default,
    InQuotedField,
}

/// Tokenizes raw CSV text into rows of trimmed fields.
///
/// A leading UTF-8 BOM is stripped, the delimiter is detected from the first
/// line, and quoting follows the usual CSV rules: `"` toggles a quoted field
/// and a doubled `""` inside one emits a literal quote. Rows with no
/// non-empty field are dropped; the final unterminated row is flushed at end
/// of input when it has content.
pub fn tokenize(input: &str) -> Vec<Row> {
    let text = input.strip_prefix('\u{feff}').unwrap_or(input);
    let delimiter = detect_delimiter(text);

    let mut rows: Vec<Row> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut state = State::Default;
    let mut line = 1usize;
    let mut row_line = 1usize;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match state {
            State::Default => {
                if ch == '"' {
                    state = State::InQuotedField;
                } else if ch == delimiter {
                    fields.push(take_trimmed(&mut field));
                } else if ch == '\n' || ch == '\r' {
                    if ch == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    flush_row(&mut rows, &mut fields, &mut field, row_line);
                    line += 1;
                    row_line = line;
                } else {
                    field.push(ch);
                }
            }
            State::InQuotedField => {
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        state = State::Default;
                    }
                } else if ch == '\n' || ch == '\r' {
                    if ch == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    field.push('\n');
                    line += 1;
                } else {
                    field.push(ch);
                }
            }
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        flush_row(&mut rows, &mut fields, &mut field, row_line);
    }

    rows
}

fn take_trimmed(field: &mut String) -> String {
    let value = field.trim().to_string();
    field.clear();
    value
}

fn flush_row(rows: &mut Vec<Row>, fields: &mut Vec<String>, field: &mut String, line: usize) {
    fields.push(take_trimmed(field));
    let completed = std::mem::take(fields);
    if completed.iter().any(|value| !value.is_empty()) {
        rows.push(Row {
            line,
            fields: completed,
        });
    }
}
