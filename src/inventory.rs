//! Source inventory types: language detection and bounded file contents.
//!
//! The engine never walks the filesystem itself; the CLI (or any other
//! caller) hands it a list of `SourceFile` values that are already filtered
//! by ignore rules. `SourceFile::read` applies the configured byte ceiling
//! so oversized files arrive truncated rather than unbounded.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Languages the engine can recognize from a file extension.
///
/// Recognized is not the same as supported: anything without an extractor
/// (`Sql`, `Shell`, `Other`) is recorded as a skip, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Go,
    Rust,
    JavaScript,
    TypeScript,
    Html,
    Css,
    Scss,
    Sql,
    Shell,
    Other,
}

impl Language {
    /// Detect the language from a path's extension.
    pub fn from_path(path: &Path) -> Language {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        Language::from_extension(&ext)
    }

    /// Detect the language from a bare extension (no dot).
    pub fn from_extension(ext: &str) -> Language {
        match ext {
            "py" => Language::Python,
            "java" => Language::Java,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "js" | "jsx" | "mjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" => Language::TypeScript,
            "html" | "htm" => Language::Html,
            "css" | "less" => Language::Css,
            "scss" | "sass" => Language::Scss,
            "sql" => Language::Sql,
            "sh" | "bash" => Language::Shell,
            _ => Language::Other,
        }
    }

    /// Stable tag used in reports and skip reasons.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Html => "html",
            Language::Css => "css",
            Language::Scss => "scss",
            Language::Sql => "sql",
            Language::Shell => "shell",
            Language::Other => "unknown",
        }
    }

    /// Whether some extractor (precise or heuristic) handles this language.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Language::Sql | Language::Shell | Language::Other)
    }

    /// Whether this language is a stylesheet (custom-property tokenization).
    pub fn is_stylesheet(&self) -> bool {
        matches!(self, Language::Css | Language::Scss)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One file of the inventory: path, detected language, on-disk size, and
/// content bounded by the read ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub language: Language,
    /// Size on disk in bytes (may exceed `content.len()` when truncated).
    pub size: u64,
    pub content: String,
}

impl SourceFile {
    /// Build a source file from in-memory content (tests, embedded input).
    pub fn new<P: Into<String>, C: Into<String>>(path: P, language: Language, content: C) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            language,
            size: content.len() as u64,
            content,
        }
    }

    /// Read a file from disk, truncating content at `max_bytes`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, matching how mixed
    /// trees are scanned in practice.
    pub fn read(path: &Path, max_bytes: u64) -> anyhow::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let size = metadata.len();

        let mut buf = Vec::with_capacity(size.min(max_bytes) as usize);
        let file = File::open(path)?;
        file.take(max_bytes).read_to_end(&mut buf)?;
        let content = String::from_utf8_lossy(&buf).into_owned();

        Ok(Self {
            path: path.to_string_lossy().to_string(),
            language: Language::from_path(path),
            size,
            content,
        })
    }

    /// Number of lines in the (possibly truncated) content.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    /// Whether the content was truncated by the read ceiling.
    pub fn truncated(&self) -> bool {
        (self.content.len() as u64) < self.size
    }
}
