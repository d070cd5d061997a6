use eframe::egui;
use std::path::{Path, PathBuf};

pub const PDF_MIME: &str = "application/pdf";

/// A document picked by the user, ready for the page service.
#[derive(Clone, Debug)]
pub struct PdfSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Desktop pickers and most platforms' drag-and-drop do not report a MIME
/// type, so the extension stands in for it when none is given.
pub fn is_pdf(mime: &str, path: Option<&Path>) -> bool {
    let mime = mime.trim();
    if !mime.is_empty() {
        return mime.eq_ignore_ascii_case(PDF_MIME);
    }
    path.and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn display_name(path: Option<&Path>, fallback: &str) -> String {
    path.and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Reads a picked file. `Ok(None)` means the file was not a PDF and is ignored.
pub fn from_path(path: &Path) -> Result<Option<PdfSource>, String> {
    if !is_pdf("", Some(path)) {
        log::debug!("ignoring non-PDF file {}", path.display());
        return Ok(None);
    }
    let bytes = std::fs::read(path).map_err(|e| format!("Error loading PDF: {e}"))?;
    Ok(Some(PdfSource {
        name: display_name(Some(path), "document.pdf"),
        bytes,
    }))
}

/// Same as [`from_path`] for a file dropped on the window. Web backends hand
/// over bytes directly; native ones hand over a path.
pub fn from_dropped(file: &egui::DroppedFile) -> Result<Option<PdfSource>, String> {
    let path = file.path.as_deref();
    let fallback_name = PathBuf::from(&file.name);
    let named = path.or(Some(fallback_name.as_path()));
    if !is_pdf(&file.mime, named) {
        log::debug!("ignoring dropped file {:?} ({})", file.name, file.mime);
        return Ok(None);
    }
    if let Some(bytes) = &file.bytes {
        return Ok(Some(PdfSource {
            name: display_name(named, "document.pdf"),
            bytes: bytes.to_vec(),
        }));
    }
    match path {
        Some(p) => {
            let bytes = std::fs::read(p).map_err(|e| format!("Error loading PDF: {e}"))?;
            Ok(Some(PdfSource {
                name: display_name(Some(p), "document.pdf"),
                bytes,
            }))
        }
        None => Ok(None),
    }
}

pub fn pick_pdf() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("PDF", &["pdf"])
        .pick_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn mime_wins_over_extension() {
        assert!(is_pdf("application/pdf", Some(Path::new("scan.bin"))));
        assert!(is_pdf("Application/PDF", None));
        assert!(!is_pdf("image/png", Some(Path::new("form.pdf"))));
    }

    #[test]
    fn extension_used_without_mime() {
        assert!(is_pdf("", Some(Path::new("/tmp/W-9.PDF"))));
        assert!(!is_pdf("", Some(Path::new("/tmp/notes.txt"))));
        assert!(!is_pdf("", Some(Path::new("/tmp/pdf"))));
        assert!(!is_pdf("", None));
    }

    #[test]
    fn non_pdf_path_is_ignored_without_reading() {
        let result = from_path(Path::new("/definitely/not/here.docx"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn missing_pdf_reports_error() {
        let result = from_path(Path::new("/definitely/not/here.pdf"));
        let err = result.unwrap_err();
        assert!(err.starts_with("Error loading PDF:"), "{err}");
    }

    #[test]
    fn dropped_bytes_are_taken_as_is() {
        let file = egui::DroppedFile {
            name: "contract.pdf".to_string(),
            mime: "application/pdf".to_string(),
            bytes: Some(Arc::from(&b"%PDF-1.7"[..])),
            ..Default::default()
        };
        let source = from_dropped(&file).unwrap().unwrap();
        assert_eq!(source.name, "contract.pdf");
        assert_eq!(source.bytes, b"%PDF-1.7");
    }

    #[test]
    fn dropped_image_is_rejected() {
        let file = egui::DroppedFile {
            name: "photo.png".to_string(),
            mime: "image/png".to_string(),
            bytes: Some(Arc::from(&b"\x89PNG"[..])),
            ..Default::default()
        };
        assert!(matches!(from_dropped(&file), Ok(None)));
    }
}
