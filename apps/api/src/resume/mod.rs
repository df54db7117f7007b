// Resume Optimizer: ATS scoring, feedback and a rewritten resume.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod analyzer;
pub mod handlers;
pub mod pdf;
pub mod prompts;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::llm_client::Part;
use crate::profile::upload::PDF_MIME;

/// The resume as the model receives it: the stored PDF or plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeContent {
    Document(Bytes),
    Text(String),
}

impl ResumeContent {
    /// Prefers the stored document, then the first non-blank text candidate.
    pub fn pick<'a>(
        document: Option<Bytes>,
        texts: impl IntoIterator<Item = &'a str>,
    ) -> Option<Self> {
        if let Some(document) = document {
            return Some(ResumeContent::Document(document));
        }
        texts
            .into_iter()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(|t| ResumeContent::Text(t.to_string()))
    }
}

/// Inline PDF attachment part.
pub fn document_part(document: &[u8]) -> Part {
    Part::inline(PDF_MIME, STANDARD.encode(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_prefers_document() {
        let picked = ResumeContent::pick(Some(Bytes::from_static(b"%PDF-")), ["text"]);
        assert!(matches!(picked, Some(ResumeContent::Document(_))));
    }

    #[test]
    fn test_pick_skips_blank_text() {
        let picked = ResumeContent::pick(None, ["  ", "stored resume"]);
        assert_eq!(picked, Some(ResumeContent::Text("stored resume".to_string())));
        assert_eq!(ResumeContent::pick(None, ["", " "]), None);
    }

    #[test]
    fn test_document_part_is_base64_pdf() {
        let part = document_part(b"%PDF-1.7");
        assert_eq!(part, Part::inline("application/pdf", "JVBERi0xLjc="));
    }
}
