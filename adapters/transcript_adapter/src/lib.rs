use chatsheet_core::error::ChatError;
use chatsheet_core::ports::{Result, TranscriptSource};
use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use tracing::debug;
use zip::ZipArchive;

/// Member name exporters use for the transcript inside an archive.
pub const CANONICAL_MEMBER: &str = "_chat.txt";

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Reads a chat export from a `.txt` file or a `.zip` archive holding one
pub struct TranscriptFileSource {
    path: PathBuf,
}

impl TranscriptFileSource {
    /// Creates a new TranscriptFileSource for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_error(&self, cause: impl std::fmt::Display) -> ChatError {
        ChatError::source_read(&self.path, cause)
    }

    /// Zip extension, or zip signature in the first bytes.
    fn is_archive(&self, bytes: &[u8]) -> bool {
        let by_extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        by_extension || bytes.starts_with(ZIP_SIGNATURE)
    }

    fn read_archive_member(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| self.read_error(e))?;

        // Walk by index: file_names() does not keep archive order
        let mut members = Vec::new();
        for index in 0..archive.len() {
            let entry = archive.by_index(index).map_err(|e| self.read_error(e))?;
            if entry.is_file() && is_text_member(entry.name()) {
                members.push(entry.name().to_string());
            }
        }
        debug!(entries = archive.len(), text_members = members.len(), "scanned archive");

        let target = choose_member(&members).ok_or_else(|| ChatError::NoTranscriptFound {
            path: self.path.clone(),
        })?;
        debug!(member = %target, "reading transcript member");

        let mut member = archive.by_name(target).map_err(|e| self.read_error(e))?;
        let mut content = Vec::new();
        member
            .read_to_end(&mut content)
            .map_err(|e| self.read_error(e))?;
        Ok(content)
    }
}

fn is_text_member(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".txt")
}

/// Prefers the canonical member, at the root or in a folder; otherwise the
/// first text member.
fn choose_member(members: &[String]) -> Option<&str> {
    members
        .iter()
        .find(|name| name.rsplit('/').next() == Some(CANONICAL_MEMBER))
        .or_else(|| members.first())
        .map(String::as_str)
}

/// Splits on `\n`, `\r\n` and lone `\r`.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(['\r', '\n']) {
        lines.push(rest[..pos].to_string());
        let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + skip..];
    }
    if !rest.is_empty() {
        lines.push(rest.to_string());
    }
    lines
}

impl TranscriptSource for TranscriptFileSource {
    fn read_lines(&self) -> Result<Vec<String>> {
        // The file is read in one go so no handle outlives this call
        let bytes = fs::read(&self.path).map_err(|e| self.read_error(e))?;

        let content = if self.is_archive(&bytes) {
            self.read_archive_member(bytes)?
        } else {
            bytes
        };

        let text = String::from_utf8_lossy(&content);
        let lines = split_lines(&text);
        debug!(path = %self.path.display(), lines = lines.len(), "decoded transcript");
        Ok(lines)
    }
}
