use lopdf::Document;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Error extracting text from PDF: {0}")]
    Extraction(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Extraction(err.to_string())
    }
}

/// Text of every page that yields any, pages separated by a blank line
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();

    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let text = document.extract_text(&[*page_number])?;
        let text = text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }

    tracing::debug!(
        pages = pages.len(),
        pages_with_text = texts.len(),
        "Extracted text from PDF"
    );

    Ok(texts.join("\n\n"))
}
