//! Readability-style article extraction from HTML.
//!
//! The pipeline mirrors what a browser-side reader mode does: sanitize the
//! markup, resolve relative links against the page origin, find the subtree
//! most likely to hold the article (semantic landmarks first, then a text
//! density / link density scoring pass over block containers), flatten that
//! subtree to text with paragraph breaks, and run the result through the
//! normalizer.

use log::debug;
use url::Url;

use crate::document::{Document, MIN_URL_TEXT_LEN};
use crate::dom::{self, Selection};
use crate::error::ExtractError;
use crate::fetch::{self, HtmlTransport};
use crate::normalize::normalize;
use crate::patterns::{BOILERPLATE_NAME, CONTENT_NAME};

/// Tags whose subtrees never contribute article text.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "aside", "header", "footer", "iframe", "svg", "form",
    "figure", "button",
];

/// Tags removed outright during sanitization (active or embedded content).
const UNSAFE_TAGS: &str =
    "script, style, noscript, iframe, object, embed, template, canvas, video, audio, form";

/// Candidate containers considered by the scoring pass.
const CANDIDATE_TAGS: &[&str] = &["article", "main", "section", "div"];

/// Minimum score for a heuristic candidate to beat plain body extraction.
const MIN_CANDIDATE_SCORE: i64 = 1000;

/// Caps the text-length contribution to a candidate's score so one huge
/// wall of text cannot drown out structural signals.
const SCORE_TEXT_CAP: i64 = 8000;

/// Fetches a URL through the transport chain and extracts its article text.
pub fn extract_from_url(
    transports: &[&dyn HtmlTransport],
    url: &str,
) -> Result<Document, ExtractError> {
    let html = fetch::fetch_article_html(transports, url)?;
    extract_article(&html, url)
}

/// Extracts the main article from an already-fetched HTML document.
///
/// `origin` is the document's URL, used to resolve relative links. Fails
/// when no readable subtree is found or the cleaned text comes in under
/// [`MIN_URL_TEXT_LEN`] characters.
pub fn extract_article(html: &str, origin: &str) -> Result<Document, ExtractError> {
    let dom = dom::Document::from(html);

    sanitize(&dom);
    resolve_relative_urls(&dom, origin);

    let raw = match find_main_content(&dom) {
        Some(root) => {
            debug!(
                "article candidate: <{}> with {} chars",
                dom::tag_name(&root).unwrap_or_default(),
                dom::collapsed_text_len(&root)
            );
            filtered_block_text(&root)
        }
        None => {
            // No landmark and no scoring winner: flatten the whole body and
            // let the boilerplate filters do what they can.
            debug!("no article candidate found, extracting filtered body text");
            let body = dom.select("body");
            if body.is_empty() {
                return Err(ExtractError::NoArticleContent);
            }
            filtered_block_text(&body)
        }
    };

    let text = normalize(&raw);
    if text.is_empty() {
        return Err(ExtractError::NoArticleContent);
    }
    if text.chars().count() < MIN_URL_TEXT_LEN {
        return Err(ExtractError::ArticleTooShort {
            got: text.chars().count(),
        });
    }

    Ok(Document::plain(text))
}

/// Strips active and embedded content plus inline event handlers, the same
/// surface a sanitizer pass would remove before handing markup to a reader.
fn sanitize(dom: &dom::Document) {
    dom.select(UNSAFE_TAGS).remove();

    for node in dom.select("*").nodes() {
        let el = Selection::from(*node);
        for (name, value) in dom::attribute_pairs(node) {
            if name.starts_with("on") {
                el.remove_attr(&name);
            } else if (name == "href" || name == "src")
                && value.trim_start().to_ascii_lowercase().starts_with("javascript:")
            {
                el.remove_attr(&name);
            }
        }
    }
}

/// Rewrites relative `href`/`src` attributes as absolute URLs against the
/// document origin.
fn resolve_relative_urls(dom: &dom::Document, origin: &str) {
    let Ok(base) = Url::parse(origin) else {
        return;
    };

    for node in dom.select("[href], [src]").nodes() {
        let el = Selection::from(*node);
        for attr in ["href", "src"] {
            let Some(value) = el.attr(attr) else {
                continue;
            };
            let value = value.trim().to_string();
            if value.is_empty()
                || value.starts_with('#')
                || value.contains("://")
                || value.starts_with("data:")
                || value.starts_with("mailto:")
            {
                continue;
            }
            if let Ok(resolved) = base.join(&value) {
                el.set_attr(attr, resolved.as_str());
            }
        }
    }
}

/// Finds the subtree most likely to contain the article.
///
/// Semantic landmarks win outright when they hold a useful amount of text;
/// otherwise every block container is scored and the best one is returned
/// if it clears the minimum score.
fn find_main_content(dom: &dom::Document) -> Option<Selection<'_>> {
    for selector in ["article", "[role='article']", "main", "[role='main']"] {
        let sel = dom.select(selector);
        if !sel.is_empty() && dom::collapsed_text_len(&sel.first()) >= MIN_URL_TEXT_LEN {
            return Some(sel.first());
        }
    }

    find_scored_candidate(dom)
}

/// Text density / link density scoring pass over block containers.
fn find_scored_candidate(dom: &dom::Document) -> Option<Selection<'_>> {
    let mut best: Option<Selection> = None;
    let mut best_score = 0i64;

    for tag in CANDIDATE_TAGS {
        for node in dom.select(tag).nodes() {
            let el = Selection::from(*node);

            if has_boilerplate_name(&el) {
                continue;
            }

            let text_len = dom::collapsed_text_len(&el) as i64;
            if text_len == 0 {
                continue;
            }

            let score = score_candidate(&el, text_len, depth_of(node));
            if score > best_score {
                best_score = score;
                best = Some(el);
            }
        }
    }

    if best_score >= MIN_CANDIDATE_SCORE {
        best
    } else {
        None
    }
}

/// Scores one candidate container. Paragraph structure and substantive
/// paragraphs raise the score, links lower it, and a deeper (tighter) node
/// is preferred over a wrapper with the same text.
fn score_candidate(el: &Selection, text_len: i64, depth: i64) -> i64 {
    let mut substantive_paragraphs = 0i64;
    let paragraphs = el.select("p");
    for p_node in paragraphs.nodes() {
        let p = Selection::from(*p_node);
        if dom::collapsed_text_len(&p) >= 100 {
            substantive_paragraphs += 1;
        }
    }
    let paragraph_count = paragraphs.length() as i64;

    let links = el.select("a");
    let link_count = links.length() as i64;
    let mut link_text_len = 0i64;
    for a_node in links.nodes() {
        let a = Selection::from(*a_node);
        link_text_len += dom::collapsed_text_len(&a) as i64;
    }

    let effective_len = text_len.min(SCORE_TEXT_CAP);
    let mut score = effective_len;
    score = score.saturating_add(paragraph_count.saturating_mul(200));
    score = score.saturating_add(substantive_paragraphs.saturating_mul(300));
    score = score.saturating_sub(link_count.saturating_mul(50));
    score = score.saturating_add(depth.saturating_mul(10));
    if has_content_name(el) {
        score = score.saturating_add(300);
    }

    let link_density = link_text_len as f64 / text_len as f64;
    if link_density > 0.5 {
        score /= 2;
    }

    score
}

/// Number of element ancestors between `node` and the document root.
fn depth_of(node: &dom_query::NodeRef) -> i64 {
    let mut depth = 0;
    let mut current = node.parent();
    while let Some(parent) = current {
        depth += 1;
        current = parent.parent();
    }
    depth
}

/// Whether the element's class or id names mark it as navigation/boilerplate.
fn has_boilerplate_name(el: &Selection) -> bool {
    named_like(el, &BOILERPLATE_NAME)
}

/// Whether the element's class or id names suggest article content.
fn has_content_name(el: &Selection) -> bool {
    named_like(el, &CONTENT_NAME)
}

fn named_like(el: &Selection, pattern: &regex::Regex) -> bool {
    for attr in ["class", "id"] {
        if let Some(value) = el.attr(attr) {
            if pattern.is_match(&value) {
                return true;
            }
        }
    }
    false
}

/// Whether a container is mostly link text (navigation cluster, tag cloud).
fn is_link_cluster(el: &Selection) -> bool {
    let links = el.select("a");
    if links.length() == 0 {
        return false;
    }

    let text_len = dom::collapsed_text_len(el);
    if text_len == 0 || text_len >= 300 {
        return false;
    }

    let mut link_text_len = 0usize;
    for node in links.nodes() {
        link_text_len += dom::collapsed_text_len(&Selection::from(*node));
    }

    link_text_len as f64 / text_len as f64 > 0.8
}

/// Flattens a subtree to text, inserting paragraph breaks at block-level
/// boundaries and skipping excluded tags, named boilerplate, and link
/// clusters along the way.
fn filtered_block_text(root: &Selection) -> String {
    let mut out = String::new();
    let Some(root_node) = root.nodes().first() else {
        return out;
    };

    // Depths of subtrees currently being skipped. A node is inside a skipped
    // subtree while its depth stays greater than the top entry.
    let mut skip_depths: Vec<i64> = Vec::new();

    for node in root_node.descendants() {
        let depth = depth_of(&node);
        while let Some(top) = skip_depths.last() {
            if depth <= *top {
                skip_depths.pop();
            } else {
                break;
            }
        }
        if skip_depths.last().is_some_and(|top| depth > *top) {
            continue;
        }

        if node.is_element() {
            let el = Selection::from(node);
            let tag = node.node_name().map(|t| t.to_lowercase()).unwrap_or_default();

            if EXCLUDED_TAGS.contains(&tag.as_str())
                || has_boilerplate_name(&el)
                || (matches!(tag.as_str(), "div" | "ul" | "ol" | "table") && is_link_cluster(&el))
            {
                skip_depths.push(depth);
                continue;
            }

            match tag.as_str() {
                "p" | "div" | "section" | "article" | "blockquote" | "pre" | "h1" | "h2"
                | "h3" | "h4" | "h5" | "h6" => out.push_str("\n\n"),
                "br" | "li" | "tr" => out.push('\n'),
                _ => {}
            }
        } else if node.is_text() {
            out.push_str(&node.text());
            out.push(' ');
        }
    }

    out
}
