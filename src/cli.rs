//! Command handler functions for the jacov CLI.
//!
//! Each `cmd_*` function returns its human-readable output as a `String`,
//! making them easy to test without capturing stdout. LCOV itself goes to the
//! writer the caller hands in.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::convert::{self, ConvertOptions};
use crate::resolve::PathResolver;

pub fn cmd_convert(
    report: &Path,
    format: Option<&str>,
    paths: &Path,
    options: &ConvertOptions,
    out: &mut dyn Write,
) -> Result<String> {
    let (detected_format, summary) = convert::convert(report, format, paths, options, out)
        .with_context(|| format!("Failed to convert {}", report.display()))?;

    let mut msg = String::new();
    writeln!(
        msg,
        "Converted {} as format '{}': {}/{} classes resolved, {} source files written",
        report.display(),
        detected_format,
        summary.classes_resolved,
        summary.classes_seen,
        summary.records_written,
    )
    .unwrap();
    Ok(msg)
}

pub fn cmd_resolve(
    package: &str,
    source_file: &str,
    paths: &Path,
    delimiter: &str,
) -> Result<String> {
    let entries = convert::read_path_universe(paths)
        .with_context(|| format!("Failed to read path list {}", paths.display()))?;
    let resolver = PathResolver::with_delimiter(&entries, delimiter);

    Ok(match resolver.resolve(package, source_file) {
        Some(path) => format!("{path}\n"),
        None => format!(
            "No declared path matches '{}/{}' ({} known paths)\n",
            package.trim_end_matches('/'),
            source_file,
            resolver.len()
        ),
    })
}
