//! Deterministic text cleanup for RSVP reading.
//!
//! Extracted text arrives full of artifacts: words hyphenated across line
//! wraps, paragraphs shredded into short lines, bullets, footnote markers,
//! academic citations, bare URLs, and trailing bibliography sections. This
//! module removes that noise without touching the words themselves — only
//! structural and noise characters are ever altered, and the only character
//! the pipeline may introduce is a single space used to rejoin a broken line.
//!
//! ```
//! use flowly_core::normalize;
//!
//! let noisy = "The inter-\nnational community has\nrecognized [1] that this works.";
//! let clean = normalize(noisy);
//! assert!(clean.contains("international"));
//! assert!(!clean.contains("[1]"));
//! ```

use crate::patterns::{
    BROKEN_LINE_LOWER, BROKEN_LINE_WORD, BULLET_PREFIX, EXCESS_NEWLINES, FOOTNOTE_BRACKET,
    FOOTNOTE_PAREN, HTTP_URL, HYPHEN_LINE_BREAK, INLINE_CITATION, REFERENCES_SECTION, SPACE_RUNS,
    WWW_URL,
};

/// Upper bound on cleanup passes. Each pass that changes anything strictly
/// shrinks the text or its newline count, so convergence is fast; the bound
/// only guards against a pathological pattern interaction.
const MAX_PASSES: usize = 4;

/// Cleans extraction noise out of raw text.
///
/// Pure and deterministic; never fails. Blank or whitespace-only input
/// returns an empty string. The cleanup rules are applied in a fixed order
/// (each step assumes the previous step's guarantees) and the whole pass is
/// repeated until the text stops changing, since removing noise can expose
/// new line-wrap artifacts (a stripped bullet may leave a lowercase
/// continuation line behind). The result is therefore a fixed point:
/// `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    // Canonical line endings before any line-oriented rule runs; a stray
    // carriage return would otherwise survive the broken-line rejoin.
    let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");
    for _ in 0..MAX_PASSES {
        let next = cleanup_pass(&text);
        if next == text {
            break;
        }
        text = next;
    }
    text
}

/// One ordered application of the cleanup rules.
fn cleanup_pass(input: &str) -> String {
    // 1. Rejoin words hyphenated across a line wrap: "inter-\nnational"
    let text = HYPHEN_LINE_BREAK.replace_all(input, "$1$2");

    // 2. Rejoin broken lines inside paragraphs. A line without terminal
    //    punctuation followed by a lowercase (or word-start) line is a wrap
    //    artifact, not a paragraph break; true breaks are double newlines
    //    and never match.
    let text = BROKEN_LINE_LOWER.replace_all(&text, "$1 $2");
    let text = BROKEN_LINE_WORD.replace_all(&text, "$1 $2");

    // 3. Canonical paragraph separator: collapse 3+ newlines to exactly 2.
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");

    // 4. Strip bullet/list glyphs from line starts.
    let text = BULLET_PREFIX.replace_all(&text, "");

    // 5. Strip footnote markers: "[1]", "[1-3]", and small "(2)" forms.
    let text = FOOTNOTE_BRACKET.replace_all(&text, "");
    let text = FOOTNOTE_PAREN.replace_all(&text, "$1");

    // 6. Strip inline academic citations, including multi-citation lists.
    let text = INLINE_CITATION.replace_all(&text, "");

    // 7. Strip bare URLs.
    let text = HTTP_URL.replace_all(&text, "");
    let text = WWW_URL.replace_all(&text, "");

    // 8. Truncate at a References/Bibliography heading.
    let text = REFERENCES_SECTION.replace(&text, "");

    // 9. Whitespace normalization: collapse space runs, trim every line,
    //    re-collapse blank lines the earlier steps may have created, and
    //    trim the document.
    let text = SPACE_RUNS.replace_all(&text, " ");
    let text = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
