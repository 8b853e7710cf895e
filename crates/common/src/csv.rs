//! Minimal CSV codec used by the admin exports.
//!
//! Every field is wrapped in double quotes and embedded quotes are
//! doubled. Records are separated by `\n`; newlines inside a quoted
//! field are kept verbatim, so a record can span several physical lines.
//! Count records with [`parse_csv`], not with `str::lines`.

use crate::{AppError, AppResult};

/// Quote a single field.
#[must_use]
pub fn quote_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Serialize one record as a line without the trailing separator.
#[must_use]
pub fn write_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize a header and rows. N rows produce N + 1 records; the line
/// count is only N + 1 when no field contains a newline.
#[must_use]
pub fn write_csv<H, R, S>(header: &[H], rows: R) -> String
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<S>>,
    S: AsRef<str>,
{
    let mut lines = vec![write_record(header)];
    lines.extend(rows.into_iter().map(|row| write_record(&row)));
    lines.join("\n")
}

/// Parse CSV text produced by [`write_csv`] (or any RFC 4180 style input).
pub fn parse_csv(input: &str) -> AppResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => {
                in_quotes = true;
                field_started = true;
            }
            '"' => {
                return Err(AppError::BadRequest(
                    "Unexpected quote inside unquoted CSV field".to_string(),
                ));
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                field_started = false;
            }
            _ => {
                field.push(ch);
                field_started = true;
            }
        }
    }

    if in_quotes {
        return Err(AppError::BadRequest("Unterminated quoted CSV field".to_string()));
    }
    if field_started || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_field_doubles_quotes() {
        assert_eq!(quote_field(r#"The "Wall""#), r#""The ""Wall""""#);
        assert_eq!(quote_field(""), r#""""#);
    }

    #[test]
    fn test_write_csv_line_count() {
        let rows = vec![
            vec!["a".to_string(), "1".to_string()],
            vec!["b".to_string(), "2".to_string()],
            vec!["c".to_string(), "3".to_string()],
        ];
        let csv = write_csv(&["name", "count"], rows);
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.starts_with(r#""name","count""#));
    }

    #[test]
    fn test_embedded_newline_counts_as_one_record() {
        let rows = vec![
            vec!["Crux".to_string(), "Lead wall\nand boulders".to_string()],
            vec!["Apex".to_string(), "Auto belays".to_string()],
        ];
        let csv = write_csv(&["name", "notes"], rows);

        assert_eq!(csv.lines().count(), 4);
        let parsed = parse_csv(&csv).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1][1], "Lead wall\nand boulders");
    }

    #[test]
    fn test_round_trip_recovers_original_strings() {
        let original = vec![
            vec![r#"Boulder "Barn""#.to_string(), "Austin, TX".to_string()],
            vec!["multi\nline".to_string(), String::new()],
        ];
        let csv = write_csv(&["name", "city"], original.clone());
        let parsed = parse_csv(&csv).unwrap();

        assert_eq!(parsed[0], vec!["name", "city"]);
        assert_eq!(parsed[1..].to_vec(), original);
    }

    #[test]
    fn test_parse_rejects_unterminated_quote() {
        assert!(parse_csv("\"open").is_err());
    }

    #[test]
    fn test_header_only_export() {
        let csv = write_csv::<_, Vec<Vec<String>>, String>(&["id"], Vec::new());
        assert_eq!(csv, r#""id""#);
        assert_eq!(parse_csv(&csv).unwrap(), vec![vec!["id".to_string()]]);
    }
}
