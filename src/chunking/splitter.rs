//! Fixed-budget window splitting with overlap.
//!
//! Applied to spans without usable structure, or to structural units that
//! exceed the token budget. Splitting descends a hierarchy — paragraph
//! breaks, then sentence boundaries, then word boundaries — until every
//! piece fits the budget, then packs pieces greedily into windows that
//! share a configured token span with their predecessor.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::config::ChunkingConfig;
use super::tokenizer::token_len;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("hard-coded regex"));

/// One window over the source span.
///
/// `start..end` are byte offsets into the input; `overlap_bytes` is the
/// prefix shared with the previous window. Stripping each window's overlap
/// prefix and concatenating reproduces the input exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextWindow {
    pub start: usize,
    pub end: usize,
    pub token_count: usize,
    pub overlap_bytes: usize,
    /// A single unsplittable piece exceeded the budget and was emitted
    /// whole.
    pub oversized: bool,
}

/// Smallest splittable piece after descending the hierarchy.
struct Atom {
    start: usize,
    end: usize,
    tokens: usize,
}

/// Splits `text` into windows of at most `target_tokens` estimated tokens,
/// adjacent windows sharing roughly `overlap_tokens`.
///
/// Overlap is measured in whole pieces (words at the finest level), so no
/// token is ever split. A piece that exceeds the budget even at word
/// granularity is emitted as its own window with `oversized` set; it takes
/// no overlap on either side.
pub fn split_with_overlap(text: &str, config: &ChunkingConfig) -> Vec<TextWindow> {
    if text.is_empty() {
        return Vec::new();
    }

    let target = config.target_tokens;
    let atoms = atomize(text, target);
    debug_assert!(!atoms.is_empty());

    let mut windows: Vec<TextWindow> = Vec::new();
    let mut idx = 0usize;
    // Byte offset where the next window begins when it shares an overlap
    // with the window just emitted; may fall inside an atom.
    let mut overlap_start: Option<usize> = None;

    while idx < atoms.len() {
        if atoms[idx].tokens > target {
            // Unsplittable even at word granularity. Emit whole, no overlap.
            let atom = &atoms[idx];
            windows.push(TextWindow {
                start: atom.start,
                end: atom.end,
                token_count: atom.tokens,
                overlap_bytes: 0,
                oversized: true,
            });
            idx += 1;
            overlap_start = None;
            continue;
        }

        let window_start = overlap_start.take().unwrap_or(atoms[idx].start);
        let mut packed = token_len(&text[window_start..atoms[idx].start]);
        let first_atom = idx;

        // Greedily pack atoms until the budget is exhausted or an
        // oversized atom blocks the way.
        while idx < atoms.len()
            && atoms[idx].tokens <= target
            && packed + atoms[idx].tokens <= target
        {
            packed += atoms[idx].tokens;
            idx += 1;
        }
        if idx == first_atom {
            // Forward progress: every window consumes at least one new atom.
            idx += 1;
        }

        let window_end = atoms[idx - 1].end;
        let overlap_bytes = windows
            .last()
            .map(|prev| prev.end.saturating_sub(window_start))
            .unwrap_or(0);
        windows.push(TextWindow {
            start: window_start,
            end: window_end,
            token_count: token_len(&text[window_start..window_end]),
            overlap_bytes,
            oversized: false,
        });

        if idx >= atoms.len() {
            break;
        }
        if atoms[idx].tokens > target {
            // Hard break before the oversized atom.
            continue;
        }

        // Leave room for the next new atom so its window stays in budget.
        let budget = config
            .overlap_tokens
            .min(target.saturating_sub(atoms[idx].tokens));
        overlap_start = overlap_span_start(text, &atoms, first_atom, idx, budget);
    }

    windows
}

/// Byte offset where the next window should begin so that roughly `budget`
/// tokens are shared with the window that just ended, or `None` for no
/// overlap.
///
/// Walks back whole atoms first. When the trailing atom alone exceeds the
/// remaining budget, descends into its word spans so prose built from large
/// sentences or paragraphs still carries the configured overlap forward.
fn overlap_span_start(
    text: &str,
    atoms: &[Atom],
    first_atom: usize,
    next_atom: usize,
    budget: usize,
) -> Option<usize> {
    if budget == 0 {
        return None;
    }

    let mut taken = 0usize;
    let mut cursor = next_atom;
    while cursor > first_atom + 1 {
        let candidate = atoms[cursor - 1].tokens;
        if taken + candidate > budget {
            break;
        }
        taken += candidate;
        cursor -= 1;
    }

    let mut start = atoms[cursor].start;
    if taken < budget {
        let tail_atom = &atoms[cursor - 1];
        let tail = &text[tail_atom.start..tail_atom.end];
        for (word_start, word_end) in word_spans(tail).into_iter().rev() {
            let tokens = token_len(&tail[word_start..word_end]);
            if taken + tokens > budget {
                break;
            }
            taken += tokens;
            start = tail_atom.start + word_start;
        }
    }

    (taken > 0).then_some(start)
}

/// Splits `text` into atoms no larger than `target` tokens where possible,
/// descending paragraph → sentence → word granularity. Atoms always tile
/// the input exactly.
fn atomize(text: &str, target: usize) -> Vec<Atom> {
    let mut atoms = Vec::new();
    for (start, end) in paragraph_spans(text) {
        push_paragraph(text, start, end, target, &mut atoms);
    }
    atoms
}

fn push_paragraph(text: &str, start: usize, end: usize, target: usize, out: &mut Vec<Atom>) {
    let tokens = token_len(&text[start..end]);
    if tokens <= target {
        out.push(Atom { start, end, tokens });
        return;
    }
    for (offset, sentence) in text[start..end].split_sentence_bound_indices() {
        push_sentence(text, start + offset, start + offset + sentence.len(), target, out);
    }
}

fn push_sentence(text: &str, start: usize, end: usize, target: usize, out: &mut Vec<Atom>) {
    let tokens = token_len(&text[start..end]);
    if tokens <= target {
        out.push(Atom { start, end, tokens });
        return;
    }
    for (word_start, word_end) in word_spans(&text[start..end]) {
        let span = &text[start + word_start..start + word_end];
        out.push(Atom {
            start: start + word_start,
            end: start + word_end,
            // May still exceed the target for one pathological word; the
            // packer flags it oversized.
            tokens: token_len(span),
        });
    }
}

/// Paragraph spans tiling `text`, each trailing blank-line separator
/// attached to the paragraph before it.
fn paragraph_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut previous = 0usize;
    for separator in PARAGRAPH_BREAK.find_iter(text) {
        spans.push((previous, separator.end()));
        previous = separator.end();
    }
    if previous < text.len() {
        spans.push((previous, text.len()));
    }
    spans
}

/// Word spans tiling `text`, trailing whitespace merged into the word
/// before it so windows never begin or end inside a token.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for (offset, piece) in text.split_word_bound_indices() {
        let end = offset + piece.len();
        match spans.last_mut() {
            Some(last) if piece.trim().is_empty() => last.1 = end,
            _ => spans.push((offset, end)),
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(text: &str, windows: &[TextWindow]) -> String {
        let mut out = String::new();
        for window in windows {
            let content = &text[window.start..window.end];
            out.push_str(&content[window.overlap_bytes..]);
        }
        out
    }

    fn config(target: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            target_tokens: target,
            overlap_tokens: overlap,
        }
    }

    #[test]
    fn short_text_is_one_window() {
        let text = "A short remark.";
        let windows = split_with_overlap(text, &ChunkingConfig::default());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start, 0);
        assert_eq!(windows[0].end, text.len());
        assert_eq!(windows[0].overlap_bytes, 0);
    }

    #[test]
    fn windows_respect_budget_and_overlap() {
        // 1200 one-token words ("abc "), no sentence or paragraph breaks:
        // budget 500 / overlap 50 must yield exactly three windows.
        let text = "abc ".repeat(1200);
        let windows = split_with_overlap(&text, &config(500, 50));
        assert_eq!(windows.len(), 3);
        for window in &windows {
            assert!(window.token_count <= 500, "window over budget");
            assert!(!window.oversized);
        }
        // 50 words of 4 bytes each.
        assert_eq!(windows[1].overlap_bytes, 200);
        assert_eq!(windows[2].overlap_bytes, 200);
        assert_eq!(reconstruct(&text, &windows), text);
    }

    #[test]
    fn paragraphs_are_preferred_split_points() {
        let paragraph = "word ".repeat(60).trim_end().to_string();
        let text = format!("{paragraph}\n\n{paragraph}\n\n{paragraph}");
        // Each paragraph is ~75 tokens; budget of 150 fits two per window.
        let windows = split_with_overlap(&text, &config(160, 0));
        assert!(windows.len() >= 2);
        assert_eq!(reconstruct(&text, &windows), text);
        // Window boundaries fall at paragraph breaks when no overlap is
        // configured.
        for window in &windows[1..] {
            assert_eq!(window.overlap_bytes, 0);
            assert!(text[..window.start].ends_with('\n'));
        }
    }

    #[test]
    fn paragraph_windows_carry_configured_overlap() {
        // Ten ~125-token paragraphs, each larger than the overlap budget:
        // the overlap must descend into the trailing paragraph's words
        // rather than collapse to zero.
        let paragraph = "word ".repeat(100);
        let text = vec![paragraph; 10].join("\n\n");
        let windows = split_with_overlap(&text, &config(500, 50));
        assert!(windows.len() >= 3);
        for window in &windows {
            assert!(window.token_count <= 500);
            assert!(!window.oversized);
        }
        // ~50 tokens of five-byte words.
        for window in &windows[1..] {
            assert!(
                window.overlap_bytes >= 100,
                "window at {} shares only {} bytes with its predecessor",
                window.start,
                window.overlap_bytes
            );
        }
        assert_eq!(reconstruct(&text, &windows), text);
    }

    #[test]
    fn sentences_split_oversized_paragraphs() {
        let sentence = format!("{} end. ", "word ".repeat(30).trim_end());
        let text = sentence.repeat(10);
        let windows = split_with_overlap(&text, &config(100, 10));
        assert!(windows.len() > 1);
        for window in &windows {
            assert!(window.token_count <= 100);
        }
        assert_eq!(reconstruct(&text, &windows), text);
    }

    #[test]
    fn unsplittable_word_is_flagged_oversized() {
        let giant = "x".repeat(600); // 150 estimated tokens, one word
        let text = format!("lead in words. {giant} trailing words here.");
        let windows = split_with_overlap(&text, &config(100, 10));
        let oversized: Vec<&TextWindow> = windows.iter().filter(|w| w.oversized).collect();
        assert_eq!(oversized.len(), 1);
        assert!(oversized[0].token_count > 100);
        assert_eq!(oversized[0].overlap_bytes, 0);
        assert_eq!(reconstruct(&text, &windows), text);
    }

    #[test]
    fn no_window_is_empty() {
        let text = "word ".repeat(700);
        let windows = split_with_overlap(&text, &config(200, 40));
        for window in &windows {
            assert!(window.end > window.start);
            assert!(window.end - window.start > window.overlap_bytes);
        }
    }

    #[test]
    fn empty_input_yields_no_windows() {
        assert!(split_with_overlap("", &ChunkingConfig::default()).is_empty());
    }
}
