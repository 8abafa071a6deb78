//! File-attachment ingestion.
//!
//! Given a path, produce the text content to merge into the next
//! outgoing user message.  Plain text and code files are read verbatim;
//! unrecognized extensions (including binary document formats, whose
//! decoding is out of scope) contribute an empty body so the filename
//! still rides along in the attachment list.

use std::path::Path;

use crate::error::{Error, Result};

/// Extensions read verbatim as text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "csv", "json", "xml", "html", "htm", "md", "ini", "log", "yaml", "yml", "py", "java",
    "js", "css", "tsv", "tex", "cfg", "bat", "sh", "rst", "scala", "rs", "toml",
];

/// A decoded attachment ready to merge into an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The file name (without directories), used as the display label.
    pub filename: String,

    /// The decoded text content; empty for unrecognized extensions.
    pub content: String,
}

/// Read and decode the file at `path`.
///
/// A missing or unreadable path is an `InvalidArgument` the dispatcher
/// reports without aborting; it never panics or bubbles further.
pub fn read_attachment(path: &Path) -> Result<Attachment> {
    if !path.is_file() {
        return Err(Error::invalid_argument(
            "provided file path is invalid",
            Some(path.display().to_string()),
        ));
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let content = if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        std::fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?
    } else {
        String::new()
    };

    Ok(Attachment { filename, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn text_file_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "line one\nline two\n").unwrap();

        let attachment = read_attachment(&path).unwrap();
        assert_eq!(attachment.filename, "notes.txt");
        assert_eq!(attachment.content, "line one\nline two\n");
    }

    #[test]
    fn unrecognized_extension_yields_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, [0x25, 0x50, 0x44, 0x46]).unwrap();

        let attachment = read_attachment(&path).unwrap();
        assert_eq!(attachment.filename, "report.pdf");
        assert!(attachment.content.is_empty());
    }

    #[test]
    fn missing_file_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_attachment(&dir.path().join("absent.txt")).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.MD");
        fs::write(&path, "# hi").unwrap();

        let attachment = read_attachment(&path).unwrap();
        assert_eq!(attachment.content, "# hi");
    }
}
