//! Catalog snapshot rendering and parsing.
//!
//! Snapshots are emitted by hand so the byte layout stays fixed: two-space
//! indentation, bare scalars unless quoting is required, a single-quoted
//! scan date and a double-quoted `last_modified`. Parsing goes through
//! `serde_yml`, so any YAML reader sees the same structure.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::types::{CatalogEntry, CatalogSnapshot, SNAPSHOT_VERSION};

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yml::Error),
    #[error("Catalog entry '{0}' has no files")]
    EmptyEntry(String),
}

const INDENT: &str = "  ";

/// Render entries as a snapshot stamped with the current time.
pub fn to_text(entries: &[CatalogEntry]) -> String {
    to_text_at(entries, Utc::now())
}

/// Render entries as a snapshot with an explicit scan date.
pub fn to_text_at(entries: &[CatalogEntry], scan_date: DateTime<Utc>) -> String {
    let mut out = String::new();

    push_line(&mut out, 0, "metadata:");
    push_line(
        &mut out,
        1,
        &format!("scan_date: '{}'", format_timestamp(scan_date)),
    );
    push_line(&mut out, 1, &format!("total_games: {}", entries.len()));
    push_line(&mut out, 1, &format!("version: {SNAPSHOT_VERSION}"));

    if entries.is_empty() {
        push_line(&mut out, 0, "games: []");
        return out;
    }

    push_line(&mut out, 0, "games:");
    for entry in entries {
        write_entry(&mut out, entry);
    }
    out
}

/// Parse a snapshot produced by [`to_text`] (or any equivalent YAML).
pub fn from_text(text: &str) -> Result<CatalogSnapshot, YamlError> {
    let snapshot: CatalogSnapshot = serde_yml::from_str(text)?;
    if let Some(entry) = snapshot.games.iter().find(|g| g.files.is_empty()) {
        return Err(YamlError::EmptyEntry(entry.id.clone()));
    }
    Ok(snapshot)
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_entry(out: &mut String, entry: &CatalogEntry) {
    push_line(out, 1, &format!("- id: {}", scalar(&entry.id)));
    push_line(out, 2, &format!("platform: {}", entry.platform.short_name()));
    push_line(
        out,
        2,
        &format!("last_modified: \"{}\"", escape_quoted(&entry.last_modified)),
    );

    if entry.files.is_empty() {
        push_line(out, 2, "files: []");
    } else {
        push_line(out, 2, "files:");
        for file in &entry.files {
            push_line(out, 3, &format!("- path: {}", scalar(&file.path)));
            push_line(out, 4, &format!("size: {}", file.size));
            push_line(out, 4, &format!("checksum: {}", scalar(&file.checksum)));
        }
    }

    let release = &entry.release;
    push_line(out, 2, "release:");
    push_line(out, 3, &format!("title: {}", scalar(&release.title)));
    if let Some(ref language) = release.language {
        push_line(out, 3, &format!("language: {}", scalar(language)));
    }
    if let Some(ref genre) = release.genre {
        push_line(out, 3, &format!("genre: {}", scalar(genre)));
    }
    if let Some(ref developer) = release.developer {
        push_line(out, 3, &format!("developer: {}", scalar(developer)));
    }
    if let Some(year) = release.release_year {
        push_line(out, 3, &format!("release_year: {year}"));
    }
}

fn push_line(out: &mut String, level: usize, text: &str) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

/// Emit a string scalar bare, or double-quoted when it needs it.
fn scalar(value: &str) -> String {
    if needs_quoting(value) {
        format!("\"{}\"", escape_quoted(value))
    } else {
        value.to_string()
    }
}

/// Whether a string scalar must be double-quoted.
///
/// Quoted: quote characters, backslashes, control characters and Unicode
/// line/paragraph separators, `": "`, leading or trailing whitespace, and a leading `>`, `|` or `- `.
/// Also quoted: anything a YAML reader would not give back as the same plain
/// string (empty, null literals, leading flow/anchor/tag indicators, `" #"`,
/// a trailing `:`).
fn needs_quoting(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if value
        .chars()
        .any(|c| matches!(c, '"' | '\'' | '\\') || is_unprintable(c))
    {
        return true;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return true;
    }
    if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
        return true;
    }

    let mut chars = value.chars();
    let first = chars.next().unwrap_or(' ');
    let second = chars.next();
    let indicator_then_space = second.is_none_or(char::is_whitespace);
    match first {
        '>' | '|' => return true,
        '-' | '?' | ':' if indicator_then_space => return true,
        '[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '%' | '@' | '`' => return true,
        _ => {}
    }

    matches!(value, "~" | "null" | "Null" | "NULL")
}

/// Characters a YAML reader rejects or treats as a line break when raw.
fn is_unprintable(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}')
}

/// Backslash-escape a value for a double-quoted scalar.
fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            // Every other control character is in C0, DEL or C1.
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_stay_bare() {
        assert_eq!(scalar("Super Mario Bros"), "Super Mario Bros");
        assert_eq!(scalar("/roms/nes/mario.nes"), "/roms/nes/mario.nes");
        assert_eq!(scalar("1a2b3c4d"), "1a2b3c4d");
        assert_eq!(scalar("a-b"), "a-b");
        assert_eq!(scalar("-1"), "-1");
    }

    #[test]
    fn quote_characters_force_quoting() {
        assert_eq!(scalar("Kirby's Adventure"), "\"Kirby's Adventure\"");
        assert_eq!(scalar("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(scalar("C:\\roms"), "\"C:\\\\roms\"");
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(scalar("a\nb"), "\"a\\nb\"");
        assert_eq!(scalar("a\tb"), "\"a\\tb\"");
        assert_eq!(scalar("a\rb"), "\"a\\rb\"");
    }

    #[test]
    fn colon_space_and_edge_whitespace_force_quoting() {
        assert_eq!(scalar("Zelda: Link"), "\"Zelda: Link\"");
        assert_eq!(scalar("time:12"), "time:12");
        assert_eq!(scalar(" padded"), "\" padded\"");
        assert_eq!(scalar("padded "), "\"padded \"");
    }

    #[test]
    fn block_indicators_force_quoting() {
        assert_eq!(scalar("> folded"), "\"> folded\"");
        assert_eq!(scalar("|pipe"), "\"|pipe\"");
        assert_eq!(scalar("- item"), "\"- item\"");
    }

    #[test]
    fn other_control_characters_are_escaped() {
        assert_eq!(scalar("a\u{1}b"), "\"a\\x01b\"");
        assert_eq!(scalar("a\u{7f}b"), "\"a\\x7Fb\"");
        assert_eq!(scalar("a\u{1b}b"), "\"a\\x1Bb\"");
        assert_eq!(scalar("a\u{85}b"), "\"a\\Nb\"");
        assert_eq!(scalar("a\u{2028}b"), "\"a\\Lb\"");
        assert_eq!(scalar("a\u{2029}b"), "\"a\\Pb\"");
    }

    #[test]
    fn reader_hazards_force_quoting() {
        assert_eq!(scalar(""), "\"\"");
        assert_eq!(scalar("[USA].nes"), "\"[USA].nes\"");
        assert_eq!(scalar("null"), "\"null\"");
        assert_eq!(scalar("a #b"), "\"a #b\"");
        assert_eq!(scalar("end:"), "\"end:\"");
    }

    #[test]
    fn timestamp_has_millisecond_precision() {
        let time = DateTime::parse_from_rfc3339("2024-03-05T10:20:30.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(time), "2024-03-05T10:20:30.123Z");
    }
}
