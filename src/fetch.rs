//! Fetching article HTML through an ordered transport chain.
//!
//! Actual network I/O lives outside the core: the host supplies one
//! [`HtmlTransport`] per transport path (direct fetch first, then any
//! relay/proxy fallbacks, in order). The core owns the retry policy: each
//! transport is tried in turn, its payload decoded and checked for HTML
//! shape, and the failure is only surfaced to the user once the whole chain
//! is exhausted.

use log::debug;

use crate::encoding;
use crate::error::{ExtractError, TransportError};
use crate::patterns::STRUCTURAL_HTML_TAG;

/// Deadline the host should apply to the direct fetch attempt.
pub const DIRECT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Deadline the host should apply to each fallback transport attempt.
pub const FALLBACK_FETCH_TIMEOUT_MS: u64 = 15_000;

/// Payloads at or under this size never count as an HTML document.
const MIN_HTML_PAYLOAD_LEN: usize = 500;

/// One way of fetching a URL's raw payload.
///
/// Implementations must apply their own per-attempt timeout
/// ([`DIRECT_FETCH_TIMEOUT_MS`] for the direct path,
/// [`FALLBACK_FETCH_TIMEOUT_MS`] for relays) and report any failure as a
/// [`TransportError`]; the chain in [`fetch_article_html`] decides whether
/// to keep trying.
pub trait HtmlTransport {
    /// Short label used in logs ("direct", "relay-1", ...).
    fn name(&self) -> &str;

    /// Fetches the raw payload for `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Whether a decoded payload is shaped like an HTML document.
///
/// Proxies routinely answer with JSON error bodies or tiny interstitial
/// pages; requiring a structural tag and a minimum size filters those out
/// so the chain moves on to the next transport.
#[must_use]
pub fn looks_like_html(payload: &str) -> bool {
    payload.len() > MIN_HTML_PAYLOAD_LEN && STRUCTURAL_HTML_TAG.is_match(payload)
}

/// Fetches `url` through the transport chain, returning the first payload
/// that decodes to an HTML-shaped document.
///
/// Transport failures and non-HTML payloads are logged and skipped; only
/// after every transport has been tried does the error escalate to
/// [`ExtractError::UnreachableUrl`].
pub fn fetch_article_html(
    transports: &[&dyn HtmlTransport],
    url: &str,
) -> Result<String, ExtractError> {
    for transport in transports {
        match transport.fetch(url) {
            Ok(payload) => {
                let html = encoding::decode_html_payload(&payload);
                if looks_like_html(&html) {
                    debug!("transport {} fetched {} bytes for {url}", transport.name(), payload.len());
                    return Ok(html);
                }
                debug!(
                    "transport {} returned a non-HTML payload ({} bytes) for {url}",
                    transport.name(),
                    payload.len()
                );
            }
            Err(err) => {
                debug!("transport {} failed for {url}: {err}", transport.name());
            }
        }
    }

    Err(ExtractError::UnreachableUrl)
}
