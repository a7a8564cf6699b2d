//! Structural boundary detection for agendas and minutes.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::documents::DocumentKind;

/// Enumerated agenda item markers at line starts: `1.`, `12)`, `A.`, `B)`.
static ITEM_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:\d{1,3}|[A-Z])[.)][ \t]+\S").expect("hard-coded regex")
});

/// Worded item markers: `Item 3:`, `ITEM 12.`
static ITEM_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*item[ \t]+\d{1,3}[ \t]*[:.]").expect("hard-coded regex")
});

/// Short all-caps lines in heading position: `PUBLIC COMMENT`.
static HEADING_CAPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Z][A-Z0-9 ,&/'()\-]{2,58}[ \t]*$").expect("hard-coded regex")
});

/// Short lines ending in a colon with no other sentence punctuation.
static HEADING_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[^\s:.!?;][^:\n.!?;]{0,78}:[ \t]*$").expect("hard-coded regex")
});

/// Motion markers in minutes: `MOTION:`, `MOVED`, `SECONDED`.
static MOTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:MOTION[ \t]*:|MOVED\b|SECONDED\b)").expect("hard-coded regex")
});

/// Time stamps at line starts: `6:05 PM`, `18:30`.
static TIME_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d{1,2}:\d{2}(?:[ \t]*[AaPp]\.?[Mm]\.?)?").expect("hard-coded regex")
});

/// Written-out dates at line starts: `March 14, 2024`.
static DATE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:January|February|March|April|May|June|July|August|September|October|November|December)[ \t]+\d{1,2},[ \t]+\d{4}",
    )
    .expect("hard-coded regex")
});

/// Numeric dates at line starts: `3/14/2024`.
static DATE_NUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d{1,2}/\d{1,2}/\d{2,4}\b").expect("hard-coded regex")
});

/// One structure-delimited span of a document.
///
/// Units are derived transiently during chunk construction and always tile
/// the document: the first unit starts at offset 0, each unit ends where
/// the next begins, and the last ends at the document's end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuralUnit {
    pub unit_index: usize,
    /// First line of the unit when it began at a recognized boundary.
    pub heading: Option<String>,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl StructuralUnit {
    /// Borrows the unit's text span out of the document content.
    pub fn text<'a>(&self, content: &'a str) -> &'a str {
        &content[self.start_offset..self.end_offset]
    }
}

/// Splits document content into ordered structural units.
///
/// Boundary heuristics depend on the document kind; every boundary is the
/// start of the line carrying the marker, so a unit always begins *at* its
/// marker. When no boundary is recognized anywhere, the whole content is
/// returned as a single unit and the caller relies on the fallback
/// splitter. Pure function of its inputs.
pub fn segment(content: &str, kind: DocumentKind) -> Vec<StructuralUnit> {
    if content.is_empty() {
        return Vec::new();
    }

    let patterns: &[&Regex] = match kind {
        DocumentKind::Agenda => &[&ITEM_MARKER, &ITEM_WORD, &HEADING_CAPS, &HEADING_COLON],
        DocumentKind::Minutes => &[
            &MOTION_MARKER,
            &TIME_STAMP,
            &DATE_WORD,
            &DATE_NUM,
            &HEADING_CAPS,
            &HEADING_COLON,
        ],
    };

    let mut boundaries = BTreeSet::new();
    for pattern in patterns {
        for found in pattern.find_iter(content) {
            boundaries.insert(found.start());
        }
    }

    if boundaries.is_empty() {
        return vec![StructuralUnit {
            unit_index: 0,
            heading: None,
            start_offset: 0,
            end_offset: content.len(),
        }];
    }

    let mut starts: Vec<usize> = Vec::with_capacity(boundaries.len() + 1);
    // Preamble before the first recognized boundary stays a unit of its own.
    if !boundaries.contains(&0) {
        starts.push(0);
    }
    starts.extend(boundaries.iter().copied());

    let mut units = Vec::with_capacity(starts.len());
    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(content.len());
        if start == end {
            continue;
        }
        let at_boundary = boundaries.contains(&start);
        units.push(StructuralUnit {
            unit_index: units.len(),
            heading: at_boundary.then(|| first_line(&content[start..end])),
            start_offset: start,
            end_offset: end,
        });
    }
    units
}

fn first_line(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    line.chars().take(120).collect()
}
