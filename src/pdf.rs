//! Structural text recovery from PDF documents.
//!
//! Actual PDF decoding (object parsing, fonts, decompression) is a
//! collaborator concern behind [`PdfDecoder`]; the core receives pages of
//! positioned glyph runs plus the outline tree and rebuilds reading order
//! from there. Line structure is recovered purely from vertical positions,
//! then PDF-specific noise (page numbers, running headers and footers,
//! hyphenated wraps) is dropped before the generic normalizer runs.
//!
//! Chapters come from the document outline when it has at least two titles
//! that can be located in the reconstructed text; otherwise the heuristic
//! segmenter takes over. The outline mapping is best-effort by design: each
//! title's first case-insensitive occurrence wins, and boundaries are sliced
//! between consecutive matches sorted by text position.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::chapters;
use crate::document::{Chapter, Document, MIN_PDF_TEXT_LEN};
use crate::error::ExtractError;
use crate::normalize::normalize;
use crate::patterns::{
    DASHED_PAGE_NUMBER, EXCESS_NEWLINES, HYPHEN_LINE_BREAK, PAGE_NUMBER_LINE, PAGE_OF_FOOTER,
    SPACE_RUNS,
};

/// Vertical distance (in page units, post-rounding) beyond which two runs
/// are considered to be on different lines.
pub const LINE_BREAK_Y_THRESHOLD: f32 = 5.0;

/// Progress is only reported for documents with more pages than this.
pub const PROGRESS_MIN_PAGES: usize = 20;

/// A short line must repeat at least this often across the document to be
/// treated as a running header/footer.
const REPEATED_LINE_MIN_COUNT: usize = 3;

/// Lines longer than this are never treated as running headers/footers.
const REPEATED_LINE_MAX_LEN: usize = 60;

/// Outline levels that contribute chapter titles (level 0 and 1); deeper
/// entries are traversed but not emitted.
const OUTLINE_TITLE_MAX_DEPTH: usize = 2;

/// The first outline match must start at least this far into the text for
/// the preceding text to be considered as an introduction.
const INTRO_MIN_OFFSET: usize = 200;

/// Minimum length of pre-chapter text to synthesize an "Introduction".
const INTRO_MIN_LEN: usize = 50;

/// Minimum outline chapter body length; shorter slices are discarded.
const MIN_OUTLINE_CHAPTER_LEN: usize = 20;

/// One positioned text run from a PDF page, in reading-stream order.
#[derive(Debug, Clone)]
pub struct PdfRun {
    /// Decoded glyph-run text.
    pub text: String,
    /// Vertical position of the run's baseline on the page.
    pub y: f32,
}

/// All text runs of a single page.
#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    /// Runs in content-stream order.
    pub runs: Vec<PdfRun>,
}

/// One node of the document outline (bookmark tree).
#[derive(Debug, Clone)]
pub struct PdfOutlineEntry {
    /// Bookmark title.
    pub title: String,
    /// Nested bookmarks.
    pub children: Vec<PdfOutlineEntry>,
}

/// A fully decoded PDF as delivered by the [`PdfDecoder`] collaborator.
#[derive(Debug, Clone, Default)]
pub struct DecodedPdf {
    /// Pages in document order.
    pub pages: Vec<PdfPage>,
    /// Outline roots, empty when the document has no bookmarks.
    pub outline: Vec<PdfOutlineEntry>,
}

/// Failure to decode a PDF byte stream (corrupt, encrypted, unsupported).
#[derive(Debug, thiserror::Error)]
#[error("could not decode PDF: {0}")]
pub struct PdfDecodeError(pub String);

/// Collaborator that turns raw PDF bytes into positioned text runs and an
/// outline. Implemented outside the core by whatever PDF engine the host
/// ships.
pub trait PdfDecoder {
    /// Decodes `bytes` into pages and outline.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPdf, PdfDecodeError>;
}

/// Receives extraction progress as a percentage of pages processed.
pub trait ProgressSink {
    /// Called after each page once the document is large enough to matter.
    fn on_progress(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn on_progress(&mut self, percent: u8) {
        self(percent);
    }
}

/// Decodes and extracts a PDF in one step.
pub fn extract_pdf_bytes(
    decoder: &dyn PdfDecoder,
    bytes: &[u8],
    progress: Option<&mut dyn ProgressSink>,
) -> Result<Document, ExtractError> {
    let decoded = decoder.decode(bytes).map_err(|err| {
        debug!("pdf decode failed: {err}");
        ExtractError::PdfUnreadable
    })?;
    extract_from_pdf(&decoded, progress)
}

/// Extracts a document from decoded PDF content.
///
/// Fails when the document has no pages or when the cleaned text is under
/// [`MIN_PDF_TEXT_LEN`] characters (a scanned or image-only file).
pub fn extract_from_pdf(
    pdf: &DecodedPdf,
    mut progress: Option<&mut dyn ProgressSink>,
) -> Result<Document, ExtractError> {
    if pdf.pages.is_empty() {
        return Err(ExtractError::PdfEmpty);
    }

    let report = pdf.pages.len() > PROGRESS_MIN_PAGES;
    let mut pages_text = Vec::with_capacity(pdf.pages.len());
    for (index, page) in pdf.pages.iter().enumerate() {
        pages_text.push(assemble_page_text(page));
        if report {
            if let Some(sink) = progress.as_deref_mut() {
                let percent = ((index + 1) * 100) / pdf.pages.len();
                sink.on_progress(percent as u8);
            }
        }
    }

    let text = pages_text.join("\n\n");
    let text = clean_pdf_text(&text);
    let text = normalize(&text);

    if text.chars().count() < MIN_PDF_TEXT_LEN {
        return Err(ExtractError::PdfNoText);
    }

    let chapters = chapters_from_outline(&pdf.outline, &text).or_else(|| chapters::segment(&text));

    Ok(Document {
        text,
        page_count: Some(pdf.pages.len()),
        chapters,
    })
}

/// Rebuilds one page's line structure from glyph vertical positions.
///
/// Consecutive runs are appended; a vertical jump past
/// [`LINE_BREAK_Y_THRESHOLD`] starts a new line, otherwise runs are
/// space-joined unless the text already ends in a separator.
fn assemble_page_text(page: &PdfPage) -> String {
    let mut out = String::new();
    let mut last_y: Option<f32> = None;

    for run in &page.runs {
        if run.text.is_empty() {
            continue;
        }
        let y = run.y.round();

        match last_y {
            Some(prev) if (y - prev).abs() > LINE_BREAK_Y_THRESHOLD => out.push('\n'),
            _ => {
                if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                    out.push(' ');
                }
            }
        }

        out.push_str(&run.text);
        last_y = Some(y);
    }

    out
}

/// PDF-specific cleanup applied before the generic normalizer: page-number
/// lines, "Page N of M" footers, running headers/footers repeated across
/// pages, and hyphenated line wraps.
fn clean_pdf_text(text: &str) -> String {
    let text = PAGE_NUMBER_LINE.replace_all(text, "");
    let text = PAGE_OF_FOOTER.replace_all(&text, "");
    let text = DASHED_PAGE_NUMBER.replace_all(&text, "");

    let text = drop_repeated_lines(&text);

    let text = HYPHEN_LINE_BREAK.replace_all(&text, "$1$2");
    let text = SPACE_RUNS.replace_all(&text, " ");
    let text = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Drops short lines that repeat at least [`REPEATED_LINE_MIN_COUNT`] times
/// across the document (running headers and footers).
fn drop_repeated_lines(text: &str) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.len() < REPEATED_LINE_MAX_LEN {
            *counts.entry(trimmed).or_insert(0) += 1;
        }
    }

    let repeated: HashSet<&str> = counts
        .into_iter()
        .filter(|(_, count)| *count >= REPEATED_LINE_MIN_COUNT)
        .map(|(line, _)| line)
        .collect();

    if repeated.is_empty() {
        return text.to_string();
    }

    text.lines()
        .filter(|line| !repeated.contains(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds chapters by locating outline titles in the reconstructed text.
///
/// Titles from the top two outline levels are matched case-insensitively
/// (first occurrence wins), sorted by text position, and the text is sliced
/// between consecutive matches. Returns `None` when fewer than two titles
/// can be located, letting the caller fall back to heuristic segmentation.
fn chapters_from_outline(outline: &[PdfOutlineEntry], text: &str) -> Option<Vec<Chapter>> {
    let mut titles = Vec::new();
    flatten_outline(outline, 0, &mut titles);
    if titles.len() < 2 {
        return None;
    }

    let lower = text.to_lowercase();
    if lower.len() != text.len() {
        // Lowercasing shifted byte offsets; positions would not be safe to
        // slice with. Fall back to heuristic segmentation.
        return None;
    }

    let mut positions: Vec<(usize, &str)> = titles
        .iter()
        .filter_map(|title| {
            lower
                .find(&title.to_lowercase())
                .map(|index| (index, title.as_str()))
        })
        .collect();
    positions.sort_by_key(|(index, _)| *index);
    if positions.len() < 2 {
        return None;
    }

    let mut result = Vec::new();
    for (i, (start, title)) in positions.iter().enumerate() {
        let end = positions.get(i + 1).map_or(text.len(), |next| next.0);
        let Some(slice) = text.get(*start..end) else {
            continue;
        };
        let body = slice.trim();
        if body.len() > MIN_OUTLINE_CHAPTER_LEN {
            result.push(Chapter::new(title, body.to_string()));
        }
    }

    // Text before the first located title becomes an introduction when there
    // is enough of it.
    let first = positions[0].0;
    if first > INTRO_MIN_OFFSET {
        if let Some(preface) = text.get(..first) {
            let preface = preface.trim();
            if preface.len() > INTRO_MIN_LEN {
                result.insert(0, Chapter::new("Introduction", preface.to_string()));
            }
        }
    }

    (result.len() >= 2).then_some(result)
}

fn flatten_outline(entries: &[PdfOutlineEntry], depth: usize, out: &mut Vec<String>) {
    for entry in entries {
        let title = entry.title.trim();
        if depth < OUTLINE_TITLE_MAX_DEPTH && !title.is_empty() {
            out.push(title.to_string());
        }
        flatten_outline(&entry.children, depth + 1, out);
    }
}
