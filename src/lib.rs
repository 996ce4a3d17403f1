//! # flowly-core
//!
//! Text ingestion and RSVP playback engine for the Flowly speed reader.
//!
//! The crate is two pipelines feeding one data model. Ingestion turns a
//! source (URL, uploaded file, or pasted text) into a normalized
//! [`Document`] with optional chapter structure; playback turns a document
//! into a word-at-a-time reading session with a focal highlight, punctuation
//! and paragraph-aware pacing, automatic speed ramping, and session
//! statistics.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowly_core::{extract_paste, EngineConfig, EngineSink, Phase, PlaybackEngine};
//!
//! struct Quiet;
//! impl EngineSink for Quiet {}
//!
//! let doc = extract_paste("One word at a time, reading gets faster with practice.")?;
//! let mut engine = PlaybackEngine::from_document(&doc, EngineConfig::default())?;
//! let mut sink = Quiet;
//!
//! engine.play(0, &mut sink);
//! while let Some(deadline) = engine.next_deadline() {
//!     engine.tick(deadline, &mut sink);
//! }
//! assert_eq!(engine.phase(), Phase::Completed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Collaborators
//!
//! The core does no I/O of its own and owns no timers. Hosts supply:
//!
//! - [`HtmlTransport`] implementations for fetching URLs (direct fetch plus
//!   any relay fallbacks, tried in order),
//! - a [`PdfDecoder`] that turns PDF bytes into positioned text runs,
//! - a [`ProgressStore`] for durable reading-progress checkpoints,
//! - a clock and a single cancelable timer driven by
//!   [`PlaybackEngine::next_deadline`] and [`PlaybackEngine::tick`].

mod error;
mod extract;
mod patterns;

/// Heuristic chapter segmentation (heading recognizers, chunking fallback).
pub mod chapters;

/// Core data model: sources, documents, chapters.
pub mod document;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding for fetched payloads and
/// uploaded files.
pub mod encoding;

/// RSVP playback engine: deadline-driven state machine, pacing, ramp, stats.
pub mod engine;

/// Transport chain for fetching article HTML.
pub mod fetch;

/// Readability-style article extraction from HTML.
pub mod html;

/// Text cleanup pipeline (hyphenation, broken lines, citations, noise).
pub mod normalize;

/// Structural text recovery from PDF documents.
pub mod pdf;

/// Progress checkpointing with an offline retry queue.
pub mod progress;

/// Word sequencing and optical recognition point math.
pub mod sequence;

// Public API - re-exports
pub use document::{Chapter, Document, Source};
pub use engine::{
    EngineConfig, EngineSink, FocalTheme, Phase, PlaybackEngine, RenderState, SessionStats,
    WordDisplay,
};
pub use error::{EngineError, ExtractError, TransportError};
pub use extract::{extract_file, extract_paste, extract_text_file, Extractor};
pub use fetch::HtmlTransport;
pub use normalize::normalize;
pub use pdf::PdfDecoder;
pub use progress::{ProgressCheckpoint, ProgressReporter, ProgressStore};
pub use sequence::{tokenize, Token};
