use std::collections::HashMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Default position (as a fraction of the document) after which numbered
/// lines are treated as a footnote section rather than a numbered list.
pub const DEFAULT_SECTION_THRESHOLD: f32 = 0.6;

/// A line opening a footnote body: `1. text`, `* text`-style markers.
static CONTENT_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d+|[*†‡§])\.[ \t]+(\S)").expect("Invalid footnote content regex")
});

/// A footnote reference inside prose.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\[(?P<bracket>\d{1,3}|[*†‡§])\]",
        r"|\((?P<paren>\d{1,3}|[*†‡§])\)",
        r"|(?P<sup>[⁰¹²³⁴⁵⁶⁷⁸⁹]+)",
        r"|(?P<symbol>[*†‡§])",
    ))
    .expect("Invalid footnote marker regex")
});

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Footnote bodies keyed by their marker (`"1"`, `"*"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FootnoteTable {
    notes: HashMap<String, String>,
}

impl FootnoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a footnote. The first body seen for a marker wins.
    pub fn insert(&mut self, marker: impl Into<String>, content: impl Into<String>) -> bool {
        let marker = marker.into();
        if self.notes.contains_key(&marker) {
            return false;
        }
        self.notes.insert(marker, content.into());
        true
    }

    pub fn get(&self, marker: &str) -> Option<&str> {
        self.notes.get(marker).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.notes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for FootnoteTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = FootnoteTable::new();
        for (marker, content) in iter {
            table.insert(marker, content);
        }
        table
    }
}

/// Body text with the trailing footnote section cut off.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub body_text: String,
    pub table: FootnoteTable,
}

/// A footnote reference found in prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteMarker {
    /// Marker with superscript digits folded to ASCII.
    pub token: String,
    /// Byte range of the marker as written, brackets included.
    pub range: Range<usize>,
}

/// Detects footnote sections and references in extracted document text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootnoteExtractor {
    section_threshold: f32,
}

impl Default for FootnoteExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION_THRESHOLD)
    }
}

impl FootnoteExtractor {
    /// `section_threshold` is clamped to `0.0..=1.0`.
    pub fn new(section_threshold: f32) -> Self {
        Self {
            section_threshold: section_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn section_threshold(&self) -> f32 {
        self.section_threshold
    }

    /// Split `text` into body text and footnote table.
    ///
    /// Numbered lines only count as a footnote section when the first of
    /// them starts past the section threshold; earlier ones are far more
    /// likely to be an ordinary numbered list, so the text is returned
    /// untouched with an empty table.
    pub fn extract(&self, text: &str) -> Extraction {
        let entries: Vec<(usize, usize, &str)> = CONTENT_LINE_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let line = caps.get(0)?;
                let marker = caps.get(1)?;
                let content = caps.get(2)?;
                Some((line.start(), content.start(), marker.as_str()))
            })
            .collect();

        let Some(&(section_start, _, _)) = entries.first() else {
            return Extraction::unchanged(text);
        };

        let position = section_start as f64 / text.len() as f64;
        if position <= f64::from(self.section_threshold) {
            log::debug!(
                "Numbered line at {:.0}% of document is before the footnote threshold, keeping text as is",
                position * 100.0
            );
            return Extraction::unchanged(text);
        }

        let mut table = FootnoteTable::new();
        for (i, &(_, content_start, marker)) in entries.iter().enumerate() {
            let end = entries
                .get(i + 1)
                .map(|&(next_start, _, _)| next_start)
                .unwrap_or(text.len());
            let content = WHITESPACE_RE.replace_all(text[content_start..end].trim(), " ");
            if content.is_empty() {
                continue;
            }
            if !table.insert(fold_marker(marker), content.into_owned()) {
                log::debug!("Duplicate footnote {marker:?} ignored");
            }
        }

        log::debug!(
            "Extracted {} footnotes from section at byte {section_start}",
            table.len()
        );

        Extraction {
            body_text: text[..section_start].trim_end().to_string(),
            table,
        }
    }

    /// Read footnotes where they are referenced.
    ///
    /// Every marker found in `table` becomes `". Footnote <marker>:
    /// <content>. "`; unknown markers stay as written.
    pub fn inline(&self, text: &str, table: &FootnoteTable) -> String {
        if table.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for marker in find_markers(text) {
            let Some(content) = table.get(&marker.token) else {
                continue;
            };
            out.push_str(&text[last..marker.range.start]);
            out.truncate(out.trim_end().len());

            let lead = match out.chars().last() {
                None => "",
                Some('.' | '!' | '?') => " ",
                Some(_) => ". ",
            };

            // A terminator right after the marker closes the note instead.
            let after = &text[marker.range.end..];
            let (closing, skip) = match after.chars().next() {
                Some(c @ ('.' | '!' | '?')) => (c, c.len_utf8()),
                _ => ('.', 0),
            };
            let body = content.trim_end_matches(|c: char| c == '.' || c.is_whitespace());
            let rest = &after[skip..];
            let gap = if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                ""
            } else {
                " "
            };

            out.push_str(&format!("{lead}Footnote {}: {body}", marker.token));
            if !body.ends_with(['!', '?']) {
                out.push(closing);
            }
            out.push_str(gap);

            last = marker.range.end + skip;
        }

        out.push_str(&text[last..]);
        out
    }
}

impl Extraction {
    fn unchanged(text: &str) -> Self {
        Self {
            body_text: text.to_string(),
            table: FootnoteTable::new(),
        }
    }
}

/// Find every footnote reference in `text`, in reading order.
pub fn find_markers(text: &str) -> Vec<FootnoteMarker> {
    MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = if let Some(m) = caps.name("bracket").or_else(|| caps.name("paren")) {
                m.as_str().to_string()
            } else if let Some(m) = caps.name("sup") {
                fold_marker(m.as_str())
            } else {
                // A bare symbol glued to a word is not a reference.
                let next = text[whole.end()..].chars().next();
                if next.is_some_and(|c| c.is_alphanumeric() || c == '_') {
                    return None;
                }
                whole.as_str().to_string()
            };
            Some(FootnoteMarker {
                token,
                range: whole.range(),
            })
        })
        .collect()
}

/// Fold superscript digits to ASCII so `³` and `3` name the same note.
pub fn fold_marker(marker: &str) -> String {
    marker
        .chars()
        .map(|c| match c {
            '⁰' => '0',
            '¹' => '1',
            '²' => '2',
            '³' => '3',
            '⁴' => '4',
            '⁵' => '5',
            '⁶' => '6',
            '⁷' => '7',
            '⁸' => '8',
            '⁹' => '9',
            other => other,
        })
        .collect()
}
