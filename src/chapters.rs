//! Heuristic chapter segmentation.
//!
//! Tries a fixed set of heading recognizers against each line of the text;
//! the first pattern that matches at least two lines wins and the text is
//! sliced between consecutive heading lines. Long texts with no recognizable
//! headings fall back to fixed-size chunking on paragraph boundaries. Either
//! way, fewer than two resulting chapters means the document is treated as
//! single-chapter and `None` is returned.

use regex::Regex;

use crate::document::Chapter;
use crate::patterns::{CHAPTER_HEADINGS, PARAGRAPH_SPLIT};

/// Word count above which a heading-less document is chunked.
pub const CHUNK_THRESHOLD_WORDS: usize = 5000;

/// Target chunk size for the fallback splitter.
pub const CHUNK_TARGET_WORDS: usize = 2000;

/// Minimum length of pre-heading text to synthesize an "Introduction".
const MIN_INTRO_LEN: usize = 100;

/// Minimum chapter body length; shorter slices are discarded.
const MIN_CHAPTER_LEN: usize = 30;

/// Splits text into chapters, or returns `None` when no strategy yields at
/// least two.
#[must_use]
pub fn segment(text: &str) -> Option<Vec<Chapter>> {
    for pattern in CHAPTER_HEADINGS.iter() {
        if let Some(chapters) = split_by_heading(text, pattern) {
            return Some(chapters);
        }
    }

    let word_count = text.split_whitespace().count();
    if word_count > CHUNK_THRESHOLD_WORDS {
        return chunk_by_paragraphs(text, CHUNK_TARGET_WORDS);
    }

    None
}

/// Slices the text between lines matching one heading pattern. The heading
/// line belongs to the chapter that follows it; text before the first
/// heading becomes an "Introduction" chapter when it is long enough.
fn split_by_heading(text: &str, pattern: &Regex) -> Option<Vec<Chapter>> {
    let lines: Vec<&str> = text.split('\n').collect();

    let mut headings: Vec<(usize, &str)> = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if pattern.is_match(trimmed) {
            headings.push((index, trimmed));
        }
    }
    if headings.len() < 2 {
        return None;
    }

    let mut chapters = Vec::new();

    let preface = lines[..headings[0].0].join("\n").trim().to_string();
    if preface.len() > MIN_INTRO_LEN {
        chapters.push(Chapter::new("Introduction", preface));
    }

    for (i, (start, title)) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map_or(lines.len(), |next| next.0);
        let body = lines[*start..end].join("\n").trim().to_string();
        if body.len() > MIN_CHAPTER_LEN {
            chapters.push(Chapter::new(title, body));
        }
    }

    (chapters.len() >= 2).then_some(chapters)
}

/// Fallback for very long texts with no headings: accumulate whole
/// paragraphs until a chunk would exceed the target, then cut. A paragraph
/// is never split across chunks.
fn chunk_by_paragraphs(text: &str, words_per_chunk: usize) -> Option<Vec<Chapter>> {
    let mut chapters = Vec::new();
    let mut current = String::new();
    let mut current_words = 0;
    let mut section = 1;

    for paragraph in PARAGRAPH_SPLIT.split(text) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let paragraph_words = paragraph.split_whitespace().count();

        if current_words > 0 && current_words + paragraph_words > words_per_chunk {
            chapters.push(Chapter::new(
                &format!("Section {section}"),
                std::mem::take(&mut current),
            ));
            section += 1;
            current_words = 0;
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
        current_words += paragraph_words;
    }

    if current.trim().len() > MIN_CHAPTER_LEN {
        chapters.push(Chapter::new(&format!("Section {section}"), current));
    }

    (chapters.len() >= 2).then_some(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(sentences: usize) -> String {
        "This sentence pads the chapter body out to a useful length. ".repeat(sentences)
    }

    #[test]
    fn detects_chapter_headings() {
        let text = format!("Chapter 1\n{}\nChapter 2\n{}", body(2), body(2));
        let chapters = segment(&text).unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Chapter 1");
        assert_eq!(chapters[1].title, "Chapter 2");
    }

    #[test]
    fn heading_line_belongs_to_following_chapter() {
        let text = format!("Chapter 1\n{}\nChapter 2\n{}", body(2), body(2));
        let chapters = segment(&text).unwrap();
        assert!(chapters[0].text.starts_with("Chapter 1"));
        assert!(chapters[1].text.starts_with("Chapter 2"));
    }

    #[test]
    fn single_heading_is_not_enough() {
        let text = format!("Chapter 1\n{}", body(4));
        assert!(segment(&text).is_none());
    }

    #[test]
    fn preface_becomes_introduction_when_long_enough() {
        let text = format!(
            "{}\nChapter 1\n{}\nChapter 2\n{}",
            body(3),
            body(2),
            body(2)
        );
        let chapters = segment(&text).unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].title, "Introduction");
    }

    #[test]
    fn short_preface_is_folded_away() {
        let text = format!("Title line\nChapter 1\n{}\nChapter 2\n{}", body(2), body(2));
        let chapters = segment(&text).unwrap();
        assert_eq!(chapters[0].title, "Chapter 1");
    }

    #[test]
    fn chapters_partition_text_in_order() {
        let text = format!("Chapter 1\n{}\nChapter 2\n{}\nChapter 3\n{}", body(2), body(3), body(2));
        let chapters = segment(&text).unwrap();
        let rejoined: String = chapters
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let canon = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(canon(&rejoined), canon(&text));
    }

    #[test]
    fn part_and_section_headings_are_recognized() {
        let text = format!("Part I\n{}\nPart II\n{}", body(2), body(2));
        assert!(segment(&text).is_some());

        let text = format!("Section 1\n{}\nSection 2\n{}", body(2), body(2));
        assert!(segment(&text).is_some());
    }

    #[test]
    fn short_text_without_headings_is_single_chapter() {
        assert!(segment(&body(20)).is_none());
    }

    #[test]
    fn long_heading_less_text_is_chunked_on_paragraphs() {
        // 60 paragraphs of 100 words each: 6000 words total
        let paragraph = "word ".repeat(100);
        let text = vec![paragraph.trim().to_string(); 60].join("\n\n");

        let chapters = segment(&text).unwrap();
        assert!(chapters.len() >= 3);
        for chapter in &chapters {
            assert!(chapter.text.split_whitespace().count() <= CHUNK_TARGET_WORDS);
            assert!(chapter.title.starts_with("Section "));
        }
    }

    #[test]
    fn chunking_never_splits_a_paragraph() {
        let paragraph = "word ".repeat(100);
        let text = vec![paragraph.trim().to_string(); 60].join("\n\n");
        let chapters = segment(&text).unwrap();
        for chapter in &chapters {
            for para in chapter.text.split("\n\n") {
                assert_eq!(para.split_whitespace().count(), 100);
            }
        }
    }
}
