//! Compiled regex patterns for text cleanup, chapter detection, and content
//! extraction.
//!
//! All patterns are compiled once at first use via `LazyLock`. Patterns are
//! organized by the pipeline stage that consumes them.

#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Normalizer Patterns
// =============================================================================

/// Matches a word broken across a line by a trailing hyphen.
/// Replacement `$1$2` rejoins the halves without the hyphen.
pub static HYPHEN_LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w)-\s*\n\s*(\w)").expect("HYPHEN_LINE_BREAK regex")
});

/// Matches a broken line inside a paragraph: the previous line does not end
/// with sentence punctuation and the next line starts with a lowercase letter.
/// A paragraph break can never match because the character after the newline
/// must be a letter, not another newline.
pub static BROKEN_LINE_LOWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^\n.!?:;])\n([a-z])").expect("BROKEN_LINE_LOWER regex")
});

/// Matches single-newline wraps between two word characters.
pub static BROKEN_LINE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w)\n(\w)").expect("BROKEN_LINE_WORD regex")
});

/// Matches 3+ consecutive newlines; collapsed to the canonical paragraph
/// separator (exactly two).
pub static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("EXCESS_NEWLINES regex")
});

/// Matches bullet and list glyphs at the start of a line.
pub static BULLET_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[•\-–—*▪▸►○●][ \t]*").expect("BULLET_PREFIX regex")
});

/// Matches bracketed footnote markers: `[1]`, `[23]`, `[1,2]`, `[1-3]`.
pub static FOOTNOTE_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d+(?:[,\-–]\d+)*\]").expect("FOOTNOTE_BRACKET regex")
});

/// Matches small parenthesized footnote markers (`(1)` through `(99)`)
/// followed by whitespace, punctuation, or end of text. The trailing
/// character is captured so the replacement can keep it.
pub static FOOTNOTE_PAREN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\d{1,2}\)([\s.,;]|$)").expect("FOOTNOTE_PAREN regex")
});

/// Matches inline academic citations: `(Smith et al., 2021)`,
/// `(Jones, 2020)`, and semicolon-joined multi-citation lists.
pub static INLINE_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\([A-Z][a-zA-Z\s&.,;]+(?:et\s+al\.?)?\s*,?\s*\d{4}[a-z]?(?:\s*;\s*[A-Z][a-zA-Z\s&.,]+(?:et\s+al\.?)?\s*,?\s*\d{4}[a-z]?)*\)",
    )
    .expect("INLINE_CITATION regex")
});

/// Matches bare http/https URLs.
pub static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://[^\s)>\]]+").expect("HTTP_URL regex")
});

/// Matches bare www-prefixed URLs.
pub static WWW_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)www\.[^\s)>\]]+").expect("WWW_URL regex")
});

/// Matches a References/Bibliography heading on its own line and everything
/// after it. The whole match is discarded.
pub static REFERENCES_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\n\s*(?:references|bibliography|works\s+cited|literature\s+cited)\s*\n.*")
        .expect("REFERENCES_SECTION regex")
});

/// Matches runs of spaces and tabs for whitespace normalization.
pub static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]+").expect("SPACE_RUNS regex")
});

/// Matches a blank-line paragraph boundary (a newline, optional horizontal
/// whitespace, and at least one more newline).
pub static PARAGRAPH_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n").expect("PARAGRAPH_SPLIT regex")
});

// =============================================================================
// PDF Cleanup Patterns
// =============================================================================

/// Matches lines that are nothing but a page number.
pub static PAGE_NUMBER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d{1,4}[ \t]*$").expect("PAGE_NUMBER_LINE regex")
});

/// Matches `Page N` / `Page N of M` footer lines.
pub static PAGE_OF_FOOTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*page\s+\d+(?:\s+of\s+\d+)?[ \t]*$").expect("PAGE_OF_FOOTER regex")
});

/// Matches `- 12 -` style centered page-number lines.
pub static DASHED_PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*-\s*\d+\s*-[ \t]*$").expect("DASHED_PAGE_NUMBER regex")
});

// =============================================================================
// Chapter Heading Patterns
// =============================================================================

/// Heading recognizers tried in order against each trimmed line of a
/// document. The first pattern that matches at least two lines wins.
pub static CHAPTER_HEADINGS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "Chapter 1", "Chapter One", "CHAPTER 1: Title", "Ch. 3"
        Regex::new(
            r"(?i)^(?:chapter|ch\.?)\s+(?:\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty)[\s:.\-—]*",
        )
        .expect("chapter heading regex"),
        // "Part 1", "Part One", "PART IV"
        Regex::new(
            r"(?i)^part\s+(?:\d+|[ivxlc]+|one|two|three|four|five|six|seven|eight|nine|ten)[\s:.\-—]*",
        )
        .expect("part heading regex"),
        // "Section 1"
        Regex::new(r"(?i)^section\s+\d+[\s:.\-—]*").expect("section heading regex"),
        // "1. Title" numbered chapters: short titled line starting uppercase
        Regex::new(r"^\d{1,3}\.\s+[A-Z].{2,60}$").expect("numbered heading regex"),
    ]
});

// =============================================================================
// HTML Content Identification Patterns
// =============================================================================

/// Matches class/id names indicating navigation or boilerplate chrome.
/// `nav` only matches at token boundaries so compound layout names like
/// `in-page-nav-container` are left alone. Only `site-header`/`page-header`
/// count as chrome; compound names like `article-header` are content.
pub static BOILERPLATE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^nav$|^nav[-_]|[-_]nav$|navbar|navigation|\bmenu\b|breadcrumb|\bsidebar\b|comment|shar(?:e|ing)|social|related|recommend|promo|sponsor|\bfooter\b|site[-_]?header|page[-_]?header|banner|subscribe|newsletter|cookie|consent|copyright|disclaimer|\bbyline\b|widget|\blogin\b|\bsignup\b|popup|modal)",
    )
    .expect("BOILERPLATE_NAME regex")
});

/// Matches class/id names likely to wrap the main article content.
pub static CONTENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|content|post|entry|story|text|body|main)").expect("CONTENT_NAME regex")
});

/// Matches payloads that contain at least one structural HTML tag. Used by
/// the fetch layer to reject JSON/error-page responses from flaky proxies.
pub static STRUCTURAL_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<html|<body|<div|<article|<p[\s>]").expect("STRUCTURAL_HTML_TAG regex")
});
