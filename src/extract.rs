//! Source dispatch: turning a URL, an uploaded file, or pasted text into a
//! [`Document`].
//!
//! The source kind is matched exactly once, here, to pick an extraction
//! path. URL sources go through the transport chain and article extraction;
//! files dispatch on their extension (PDF, plain text, or a best-effort
//! plain-text fallback for unknown extensions); pasted text takes the same
//! path as a `.txt` file.

use crate::chapters;
use crate::document::{Document, Source, MIN_FILE_TEXT_LEN, MIN_URL_TEXT_LEN};
use crate::encoding;
use crate::error::ExtractError;
use crate::fetch::HtmlTransport;
use crate::html;
use crate::normalize::normalize;
use crate::pdf::{self, PdfDecoder, ProgressSink};

/// Extraction entry point over all three source kinds.
///
/// Holds the collaborators the individual extractors need: the ordered
/// transport chain for URL fetching and the PDF decoding engine. Text and
/// paste extraction need neither.
pub struct Extractor<'a> {
    transports: &'a [&'a dyn HtmlTransport],
    pdf_decoder: &'a dyn PdfDecoder,
}

impl<'a> Extractor<'a> {
    /// Builds an extractor over the host's transport chain and PDF decoder.
    #[must_use]
    pub fn new(transports: &'a [&'a dyn HtmlTransport], pdf_decoder: &'a dyn PdfDecoder) -> Self {
        Self {
            transports,
            pdf_decoder,
        }
    }

    /// Extracts a document from any source.
    pub fn extract(&self, source: &Source) -> Result<Document, ExtractError> {
        self.dispatch(source, None)
    }

    /// Extracts a document, reporting page-level progress for large PDFs.
    pub fn extract_with_progress(
        &self,
        source: &Source,
        progress: &mut dyn ProgressSink,
    ) -> Result<Document, ExtractError> {
        self.dispatch(source, Some(progress))
    }

    fn dispatch(
        &self,
        source: &Source,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<Document, ExtractError> {
        match source {
            Source::Url(url) => html::extract_from_url(self.transports, url),
            Source::Paste(text) => extract_paste(text),
            Source::File { name, bytes } => extract_file(self.pdf_decoder, name, bytes, progress),
        }
    }
}

/// Extracts a document from pasted text.
///
/// Takes the same cleanup and segmentation path as an uploaded `.txt` file;
/// fails when fewer than [`MIN_FILE_TEXT_LEN`] characters survive cleanup.
pub fn extract_paste(text: &str) -> Result<Document, ExtractError> {
    text_document(text, MIN_FILE_TEXT_LEN)
}

/// Extracts a document from the raw bytes of a text file.
///
/// Byte-order marks are honored; content is otherwise decoded as UTF-8 with
/// lossy replacement.
pub fn extract_text_file(bytes: &[u8]) -> Result<Document, ExtractError> {
    text_document(&encoding::decode_text_file(bytes), MIN_FILE_TEXT_LEN)
}

/// Extracts a document from an uploaded file, dispatching on its extension.
///
/// Unknown extensions are accepted as plain text when the decoded content
/// exceeds [`MIN_URL_TEXT_LEN`] characters; anything shorter is reported as
/// an unsupported format.
pub fn extract_file(
    pdf_decoder: &dyn PdfDecoder,
    name: &str,
    bytes: &[u8],
    progress: Option<&mut dyn ProgressSink>,
) -> Result<Document, ExtractError> {
    match extension(name).as_deref() {
        Some("pdf") => pdf::extract_pdf_bytes(pdf_decoder, bytes, progress),
        Some("txt" | "text" | "md") => extract_text_file(bytes),
        _ => {
            let decoded = encoding::decode_text_file(bytes);
            if decoded.trim().chars().count() > MIN_URL_TEXT_LEN {
                text_document(&decoded, MIN_FILE_TEXT_LEN)
            } else {
                Err(ExtractError::UnsupportedFile)
            }
        }
    }
}

/// Shared tail of every plain-text path: normalize, gate on length, segment.
fn text_document(raw: &str, min_len: usize) -> Result<Document, ExtractError> {
    let text = normalize(raw);
    let got = text.chars().count();
    if got < min_len {
        return Err(ExtractError::TextTooShort { got });
    }
    let chapters = chapters::segment(&text);
    Ok(Document {
        text,
        page_count: None,
        chapters,
    })
}

fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}
