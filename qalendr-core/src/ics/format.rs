//! Low-level ICS text formatting: escaping, line folding, date stamps.

use chrono::{DateTime, NaiveDate, Utc};

/// UID host suffix for generated events.
pub const UID_DOMAIN: &str = "qalendr.com";

/// Escape TEXT property values per RFC 5545 §3.3.11.
///
/// Backslash must be escaped first so literal backslashes do not collide
/// with the escape sequences produced for the other characters.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Inverse of [`escape_text`]. A lone trailing backslash passes through
/// unchanged.
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some(';') => out.push(';'),
            Some(',') => out.push(','),
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Fold a content line to 75 characters, continuation lines to 74 plus
/// their leading space (RFC 5545 §3.1).
pub fn fold_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= 75 {
        return line.to_string();
    }

    let mut out: String = chars[..75].iter().collect();
    let mut rest = &chars[75..];
    while !rest.is_empty() {
        let take = rest.len().min(74);
        out.push_str("\r\n ");
        out.extend(&rest[..take]);
        rest = &rest[take..];
    }
    out
}

/// Join already-folded content lines with CRLF.
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\r\n")
}

/// VALUE=DATE form, e.g. `20250418`.
pub fn format_ics_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// DTSTAMP form, e.g. `20250418T093000Z`.
pub fn format_dtstamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Globally unique event identifier.
pub fn event_uid(id: &str) -> String {
    format!("{id}@{UID_DOMAIN}")
}
