//! In-memory view of an analyzer's coverage bundle. Adapters (see
//! [`crate::parsers`]) produce a [`Bundle`]; the LCOV emitter only relies on
//! the read-only traversal traits, so other analyzers can plug in their own
//! types without going through these structs.

use serde::{Deserialize, Serialize};

/// A single line that was instrumentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCoverage {
    pub line_number: u32,
    pub hit_count: u64,
}

/// A single branch arm on a given line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCoverage {
    pub line_number: u32,
    pub branch_index: u32,
    pub hit_count: u64,
}

/// A method of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCoverage {
    pub name: String,
    /// JVM descriptor, e.g. `(I)V`.
    #[serde(default)]
    pub descriptor: String,
    pub first_line: Option<u32>,
    pub hit_count: u64,
}

/// Coverage for one analyzed class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCoverage {
    pub name: String,
    pub package_name: String,
    /// Absent for classes compiled without debug information.
    pub source_file_name: Option<String>,
    #[serde(default)]
    pub lines: Vec<LineCoverage>,
    #[serde(default)]
    pub branches: Vec<BranchCoverage>,
    #[serde(default)]
    pub methods: Vec<MethodCoverage>,
}

impl ClassCoverage {
    pub fn new(name: &str, package_name: &str, source_file_name: &str) -> Self {
        Self {
            name: name.to_string(),
            package_name: package_name.to_string(),
            source_file_name: Some(source_file_name.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCoverage {
    pub name: String,
    #[serde(default)]
    pub classes: Vec<ClassCoverage>,
}

impl PackageCoverage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// The complete result of reading one analyzer report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub packages: Vec<PackageCoverage>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Read-only traversal contract
// ---------------------------------------------------------------------------

/// Per-class accessors the emitter needs.
pub trait ClassView {
    fn name(&self) -> &str;
    fn package_name(&self) -> &str;
    fn source_file_name(&self) -> Option<&str>;
    fn lines(&self) -> &[LineCoverage];

    fn branches(&self) -> &[BranchCoverage] {
        &[]
    }

    fn methods(&self) -> &[MethodCoverage] {
        &[]
    }
}

pub trait PackageView {
    type Class: ClassView;

    fn classes(&self) -> &[Self::Class];
}

pub trait BundleView {
    type Package: PackageView;

    fn packages(&self) -> &[Self::Package];
}

impl ClassView for ClassCoverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn package_name(&self) -> &str {
        &self.package_name
    }

    fn source_file_name(&self) -> Option<&str> {
        self.source_file_name.as_deref()
    }

    fn lines(&self) -> &[LineCoverage] {
        &self.lines
    }

    fn branches(&self) -> &[BranchCoverage] {
        &self.branches
    }

    fn methods(&self) -> &[MethodCoverage] {
        &self.methods
    }
}

impl PackageView for PackageCoverage {
    type Class = ClassCoverage;

    fn classes(&self) -> &[ClassCoverage] {
        &self.classes
    }
}

impl BundleView for Bundle {
    type Package = PackageCoverage;

    fn packages(&self) -> &[PackageCoverage] {
        &self.packages
    }
}
