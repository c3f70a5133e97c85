/// Auto-detection of analyzer report formats.
///
/// Strategy:
///   1. Ask each adapter whether it recognizes the file name or leading bytes
///   2. Fall back to CLI --format override (handled by caller)
use std::path::Path;

use crate::error::Error;
use crate::parsers;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jacoco,
    Json,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Jacoco => "jacoco",
            Format::Json => "json",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jacoco" | "xml" => Ok(Format::Jacoco),
            "json" => Ok(Format::Json),
            _ => Err(Error::Parse(format!(
                "Unknown format: '{}'. Supported: jacoco, json",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the report format from filename and file content.
pub fn detect_format(path: &Path, content: &[u8]) -> Option<Format> {
    parsers::all()
        .into_iter()
        .find(|parser| parser.can_parse(path, content))
        .map(|parser| parser.format())
}
