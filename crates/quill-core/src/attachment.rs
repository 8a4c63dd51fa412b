//! File attachments for outgoing messages.
//!
//! A pasted path becomes an [`Attachment`] only after the full validation
//! pipeline passes: allowed extension, regular file, size limit, readable,
//! MIME sniff. Every failure is an [`AttachmentError`] so the caller can fall
//! back to treating the paste as plain text.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AttachmentsConfig;

/// How many leading bytes the MIME sniffer looks at.
const MIME_SNIFF_LEN: usize = 512;

/// A file attached to a draft message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Absolute path the attachment was loaded from.
    pub file_path: PathBuf,
    /// Base name for display.
    pub file_name: String,
    /// Sniffed MIME type.
    pub mime_type: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// Why a pasted path could not become an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    /// The path does not point at a regular file.
    InvalidPath(String),
    /// The extension is not in the allowed list.
    UnsupportedExtension(String),
    /// The file exceeds the configured size limit.
    TooLarge { size: u64, limit: u64 },
    /// The file could not be read.
    Io(String),
}

impl fmt::Display for AttachmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentError::InvalidPath(path) => write!(f, "not a regular file: {path}"),
            AttachmentError::UnsupportedExtension(path) => {
                write!(f, "unsupported file type: {path}")
            }
            AttachmentError::TooLarge { size, limit } => {
                write!(f, "file is {size} bytes, limit is {limit}")
            }
            AttachmentError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AttachmentError {}

/// Normalizes pasted text into a candidate path.
///
/// Shell-escaped spaces and parens are unescaped, `~/` expands to the home
/// directory, and relative paths resolve against `root` (the chat root, not
/// the process working directory).
pub fn normalize_pasted_path(text: &str, root: &Path) -> PathBuf {
    let unescaped = text
        .replace("\\ ", " ")
        .replace("\\(", "(")
        .replace("\\)", ")");
    let trimmed = unescaped.trim();

    if let Some(stripped) = trimmed.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }

    let path = PathBuf::from(trimmed);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// Returns true if the path ends in one of the allowed extensions.
///
/// Matches as a case-insensitive suffix so `photo.PNG` passes with `.png`.
pub fn is_extension_allowed(path: &Path, rules: &AttachmentsConfig) -> bool {
    let lower = path.to_string_lossy().to_lowercase();
    rules
        .extensions
        .iter()
        .any(|ext| lower.ends_with(&ext.to_lowercase()))
}

/// Sniffs a MIME type from the first bytes of the content.
pub fn sniff_mime(content: &[u8]) -> String {
    let prefix = &content[..content.len().min(MIME_SNIFF_LEN)];
    infer::get(prefix)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Runs the full validation pipeline on a candidate path.
///
/// # Errors
/// Returns the first failing check: extension, regular file, size, read.
pub fn load_attachment(
    path: &Path,
    rules: &AttachmentsConfig,
) -> Result<Attachment, AttachmentError> {
    if !is_extension_allowed(path, rules) {
        return Err(AttachmentError::UnsupportedExtension(
            path.display().to_string(),
        ));
    }

    let meta = fs::metadata(path).map_err(|e| AttachmentError::Io(e.to_string()))?;
    if !meta.is_file() {
        return Err(AttachmentError::InvalidPath(path.display().to_string()));
    }
    if meta.len() > rules.max_size_bytes() {
        return Err(AttachmentError::TooLarge {
            size: meta.len(),
            limit: rules.max_size_bytes(),
        });
    }

    let content = fs::read(path).map_err(|e| AttachmentError::Io(e.to_string()))?;
    let mime_type = sniff_mime(&content);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AttachmentError::InvalidPath(path.display().to_string()))?;

    Ok(Attachment {
        file_path: path.to_path_buf(),
        file_name,
        mime_type,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    fn rules() -> AttachmentsConfig {
        AttachmentsConfig::default()
    }

    #[test]
    fn test_normalize_unescapes_spaces_and_parens() {
        let root = Path::new("/work");
        assert_eq!(
            normalize_pasted_path("/tmp/my\\ file\\ \\(1\\).png", root),
            PathBuf::from("/tmp/my file (1).png")
        );
    }

    #[test]
    fn test_normalize_resolves_relative_against_root() {
        let root = Path::new("/work/project");
        assert_eq!(
            normalize_pasted_path("shots/a.png\n", root),
            PathBuf::from("/work/project/shots/a.png")
        );
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(is_extension_allowed(Path::new("/a/photo.PNG"), &rules()));
        assert!(is_extension_allowed(Path::new("/a/photo.jpeg"), &rules()));
        assert!(!is_extension_allowed(Path::new("/a/notes.txt"), &rules()));
        assert!(!is_extension_allowed(Path::new("/a/archive.png.zip"), &rules()));
    }

    #[test]
    fn test_sniff_mime_detects_png() {
        assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
    }

    #[test]
    fn test_sniff_mime_falls_back_to_octet_stream() {
        assert_eq!(sniff_mime(b"plain text"), "application/octet-stream");
    }

    #[test]
    fn test_load_attachment_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        fs::write(&path, PNG_MAGIC).unwrap();

        let att = load_attachment(&path, &rules()).unwrap();
        assert_eq!(att.file_name, "pic.png");
        assert_eq!(att.mime_type, "image/png");
        assert_eq!(att.content, PNG_MAGIC);
    }

    #[test]
    fn test_load_attachment_rejects_extension_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        assert!(matches!(
            load_attachment(&path, &rules()),
            Err(AttachmentError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_load_attachment_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("shots.png");
        fs::create_dir(&sub).unwrap();

        assert!(matches!(
            load_attachment(&sub, &rules()),
            Err(AttachmentError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_load_attachment_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");

        assert!(matches!(
            load_attachment(&path, &rules()),
            Err(AttachmentError::Io(_))
        ));
    }

    #[test]
    fn test_load_attachment_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        fs::write(&path, vec![0u8; 2048]).unwrap();

        let small = AttachmentsConfig {
            max_size_mb: 0,
            ..AttachmentsConfig::default()
        };
        assert!(matches!(
            load_attachment(&path, &small),
            Err(AttachmentError::TooLarge { size: 2048, .. })
        ));
    }
}
