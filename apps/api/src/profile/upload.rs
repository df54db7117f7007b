use tracing::warn;

use crate::errors::AppError;

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Accepts only PDF uploads: declared content type and file header must both agree.
pub fn validate_pdf(content_type: Option<&str>, data: &[u8]) -> Result<(), AppError> {
    let declared_pdf = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME))
        .unwrap_or(false);

    if !declared_pdf || !data.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation("Please upload a PDF file.".to_string()));
    }
    Ok(())
}

/// Pulls plain text out of a PDF. Scanned or malformed documents yield `None`.
pub async fn extract_text(data: bytes::Bytes) -> Option<String> {
    let result =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data)).await;

    match result {
        Ok(Ok(text)) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {e}");
            None
        }
        Err(e) => {
            warn!("PDF text extraction task failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pdf() {
        assert!(validate_pdf(Some("application/pdf"), b"%PDF-1.7\n...").is_ok());
        assert!(validate_pdf(Some("Application/PDF; name=cv.pdf"), b"%PDF-1.4").is_ok());
    }

    #[test]
    fn test_rejects_wrong_content_type() {
        let err = validate_pdf(Some("image/png"), b"%PDF-1.7").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Please upload a PDF file."));
        assert!(validate_pdf(None, b"%PDF-1.7").is_err());
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        assert!(validate_pdf(Some("application/pdf"), b"PK\x03\x04").is_err());
        assert!(validate_pdf(Some("application/pdf"), b"").is_err());
    }

    #[tokio::test]
    async fn test_extract_text_from_garbage_is_none() {
        assert!(extract_text(bytes::Bytes::from_static(b"%PDF-garbage")).await.is_none());
    }
}
