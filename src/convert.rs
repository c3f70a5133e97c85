use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::detect::{detect_format, Format};
use crate::error::{Error, Result};
use crate::lcov::{EmitSummary, LcovEmitter};
use crate::model::Bundle;
use crate::parsers;
use crate::resolve::{PathResolver, DEFAULT_DELIMITER};

/// Knobs for one conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Separator between original and execution side of mapped path entries.
    pub delimiter: String,
    /// Written as `TN:` at the top of every block when set.
    pub test_name: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            test_name: None,
        }
    }
}

/// Read an analyzer report, auto-detecting its format (or using the override).
pub fn read_bundle(file_path: &Path, format_override: Option<&str>) -> Result<(Bundle, Format)> {
    let content = std::fs::read(file_path)?;

    let format = if let Some(fmt_str) = format_override {
        fmt_str.parse::<Format>()?
    } else {
        detect_format(file_path, &content).ok_or(Error::UnknownFormat)?
    };

    let bundle = parsers::for_format(format).parse(&content)?;
    Ok((bundle, format))
}

/// Read raw path entries, one per line. Blank lines and `#` comments are
/// skipped.
pub fn read_path_universe(file_path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(file_path)?;
    Ok(parse_path_universe(&content))
}

pub fn parse_path_universe(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read the report and path list, then write LCOV to `out`.
pub fn convert(
    report_path: &Path,
    format_override: Option<&str>,
    paths_file: &Path,
    options: &ConvertOptions,
    out: &mut dyn Write,
) -> Result<(Format, EmitSummary)> {
    let (bundle, format) = read_bundle(report_path, format_override)?;
    let paths = read_path_universe(paths_file)?;
    let resolver = PathResolver::with_delimiter(&paths, &options.delimiter);
    info!(
        report = %report_path.display(),
        %format,
        packages = bundle.packages.len(),
        known_paths = resolver.len(),
        "converting"
    );

    let mut emitter = LcovEmitter::new(&resolver, out);
    if let Some(name) = &options.test_name {
        emitter = emitter.with_test_name(name.as_str());
    }
    let summary = emitter.emit(&bundle)?;
    Ok((format, summary))
}
