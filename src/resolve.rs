//! Association of analyzed classes with declared source paths.
//!
//! The analyzer only knows a class's package (`com/example`) and bare source
//! file name (`Foo.java`). The build knows the real paths, given as raw
//! strings of the form:
//!
//!   /abs/or/relative/path/com/example/Foo.java
//!   C:\windows\style\com\example\Foo.java
//!   <original path>///<execution path>
//!
//! The third form maps an execution path (the one whose tail matches the
//! package layout) to the path that should be reported instead.
use std::collections::BTreeMap;

use tracing::warn;

/// Separator between the original and the execution side of a mapped entry.
pub const DEFAULT_DELIMITER: &str = "///";

/// One entry of the path universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPath {
    execution_path: String,
    original_path: Option<String>,
}

impl KnownPath {
    /// Parse a raw entry. Returns `None` only for blank input.
    ///
    /// A delimiter with an empty side keeps the non-empty side as a plain
    /// execution path.
    pub fn parse(raw: &str, delimiter: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        let split = if delimiter.is_empty() {
            None
        } else {
            raw.split_once(delimiter)
        };

        let entry = match split {
            None => Self::plain(raw),
            Some((original, execution)) if !original.is_empty() && !execution.is_empty() => {
                Self {
                    execution_path: normalize_separators(execution),
                    original_path: Some(normalize_separators(original)),
                }
            }
            Some((original, execution)) => {
                warn!(entry = raw, "mapped path with an empty side, keeping it unmapped");
                if execution.is_empty() {
                    Self::plain(original)
                } else {
                    Self::plain(execution)
                }
            }
        };

        if entry.execution_path.is_empty() {
            return None;
        }
        Some(entry)
    }

    fn plain(path: &str) -> Self {
        Self {
            execution_path: normalize_separators(path),
            original_path: None,
        }
    }

    pub fn execution_path(&self) -> &str {
        &self.execution_path
    }

    pub fn original_path(&self) -> Option<&str> {
        self.original_path.as_deref()
    }

    /// The path reported for classes matched through this entry.
    pub fn declared_path(&self) -> &str {
        self.original_path.as_deref().unwrap_or(&self.execution_path)
    }

    /// Whether the execution path ends with `suffix` on a component boundary.
    fn matches(&self, suffix: &str) -> bool {
        match self.execution_path.strip_suffix(suffix) {
            Some(head) => head.is_empty() || head.ends_with('/'),
            None => false,
        }
    }
}

/// Rewrite Windows separators to forward slashes.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Immutable lookup over the known path universe.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    /// Sorted by execution path; the first match wins.
    entries: Vec<KnownPath>,
}

impl PathResolver {
    /// Build a resolver using [`DEFAULT_DELIMITER`] for mapped entries.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_delimiter(paths, DEFAULT_DELIMITER)
    }

    pub fn with_delimiter<I, S>(paths: I, delimiter: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Duplicate execution paths collapse onto the first occurrence.
        let mut by_execution: BTreeMap<String, KnownPath> = BTreeMap::new();
        for raw in paths {
            if let Some(entry) = KnownPath::parse(raw.as_ref(), delimiter) {
                by_execution
                    .entry(entry.execution_path.clone())
                    .or_insert(entry);
            }
        }
        Self {
            entries: by_execution.into_values().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the declared path for a class's package and source file name.
    pub fn resolve(&self, package_name: &str, source_file_name: &str) -> Option<&str> {
        let suffix = class_suffix(package_name, source_file_name)?;
        self.entries
            .iter()
            .find(|entry| entry.matches(&suffix))
            .map(KnownPath::declared_path)
    }
}

/// `com/example` + `Foo.java` → `com/example/Foo.java`.
fn class_suffix(package_name: &str, source_file_name: &str) -> Option<String> {
    let file = normalize_separators(source_file_name);
    let file = file.trim_start_matches('/');
    if file.is_empty() {
        return None;
    }
    let package = normalize_separators(package_name);
    let package = package.trim_matches('/');
    if package.is_empty() {
        Some(file.to_string())
    } else {
        Some(format!("{package}/{file}"))
    }
}
