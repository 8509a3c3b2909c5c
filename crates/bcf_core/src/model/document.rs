//! Collaborator contract for markup and visualization-info documents.
//!
//! The codec never looks inside these documents. It only asks a collaborator
//! to load one from a staged file, or to save one into a scratch directory.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Error raised by a collaborator while loading or saving a document.
#[derive(Debug)]
pub enum DocumentError {
    /// File system failure while reading or writing `path`.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file content is not valid UTF-8 text.
    InvalidEncoding(PathBuf),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "document io failed at `{}`: {source}", path.display()),
            Self::InvalidEncoding(path) => {
                write!(f, "document at `{}` is not valid UTF-8", path.display())
            }
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidEncoding(_) => None,
        }
    }
}

/// Load/save contract implemented by markup and viewpoint collaborators.
pub trait BcfDocument: Sized {
    /// Human-readable artifact role used in logs and warnings.
    const ROLE: &'static str;

    /// Creates an empty document for a freshly authored topic.
    fn empty() -> Self;

    /// Parses a document from a file on disk.
    fn load_from_path(path: &Path) -> Result<Self, DocumentError>;

    /// Serializes the document into `path`, replacing any existing file.
    fn save_to_path(&self, path: &Path) -> Result<(), DocumentError>;
}

/// Topic markup (`markup.bcf`), kept as opaque XML text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupDocument {
    pub xml: String,
}

/// Topic viewpoint (`viewpoint.bcfv`), kept as opaque XML text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualizationInfoDocument {
    pub xml: String,
}

impl MarkupDocument {
    pub fn new(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }
}

impl VisualizationInfoDocument {
    pub fn new(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }
}

impl BcfDocument for MarkupDocument {
    const ROLE: &'static str = "markup";

    fn empty() -> Self {
        Self::default()
    }

    fn load_from_path(path: &Path) -> Result<Self, DocumentError> {
        read_xml_text(path).map(Self::new)
    }

    fn save_to_path(&self, path: &Path) -> Result<(), DocumentError> {
        write_xml_text(path, &self.xml)
    }
}

impl BcfDocument for VisualizationInfoDocument {
    const ROLE: &'static str = "viewpoint";

    fn empty() -> Self {
        Self::default()
    }

    fn load_from_path(path: &Path) -> Result<Self, DocumentError> {
        read_xml_text(path).map(Self::new)
    }

    fn save_to_path(&self, path: &Path) -> Result<(), DocumentError> {
        write_xml_text(path, &self.xml)
    }
}

fn read_xml_text(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| DocumentError::InvalidEncoding(path.to_path_buf()))
}

fn write_xml_text(path: &Path, xml: &str) -> Result<(), DocumentError> {
    std::fs::write(path, xml.as_bytes()).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{BcfDocument, DocumentError, MarkupDocument, VisualizationInfoDocument};
    use tempfile::TempDir;

    #[test]
    fn markup_save_then_load_preserves_text() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("markup.bcf");
        let doc = MarkupDocument::new("<Markup><Topic Guid=\"a\"/></Markup>");

        doc.save_to_path(&path).expect("save should succeed");
        let loaded = MarkupDocument::load_from_path(&path).expect("load should succeed");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn load_rejects_non_utf8_bytes() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("viewpoint.bcfv");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x81]).expect("write fixture");

        let err = VisualizationInfoDocument::load_from_path(&path)
            .expect_err("invalid utf-8 must be rejected");
        assert!(matches!(err, DocumentError::InvalidEncoding(_)));
    }

    #[test]
    fn empty_document_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("markup.bcf");

        MarkupDocument::empty().save_to_path(&path).expect("save should succeed");
        let loaded = MarkupDocument::load_from_path(&path).expect("empty markup should load");
        assert_eq!(loaded, MarkupDocument::default());
    }

    #[test]
    fn load_reports_missing_file_as_io_error() {
        let dir = TempDir::new().expect("temp dir");
        let err = MarkupDocument::load_from_path(&dir.path().join("absent.bcf"))
            .expect_err("missing file must fail");
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(err.to_string().contains("absent.bcf"));
    }
}
