//! Shared helpers for document rendering: date formatting, filenames and
//! text normalisation for the PDF base fonts.

use chrono::NaiveDate;

/// Format a date the way it is printed on documents (e.g. "1 January 1990").
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Re-format an ISO `YYYY-MM-DD` value for printing; other values pass through.
pub fn display_value(value: &str) -> String {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => format_long_date(date),
        Err(_) => value.trim().to_string(),
    }
}

/// `<documentType>-<documentNumber>.<extension>`, stripped of anything a
/// filesystem would reject.
pub fn document_filename(document_type: &str, document_number: &str, extension: &str) -> String {
    sanitize_filename::sanitize(format!(
        "{}-{}.{}",
        document_type.trim(),
        document_number.trim(),
        extension
    ))
}

/// Map text onto what the standard Type1 fonts can show. Latin-1 characters
/// are kept (WinAnsi); anything else becomes `?`. Control characters,
/// including DEL and the C1 range that WinAnsi draws as glyphs, become spaces.
pub fn pdf_safe_text(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => b' ',
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => b' ',
            c if (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap at `width` characters.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
