use jacov::model::{BundleView, ClassView, LineCoverage, PackageView};

/// Minimal analyzer-side bundle: a class is just its names and lines.
pub struct FakeClass {
    pub name: &'static str,
    pub package_name: &'static str,
    pub source_file_name: &'static str,
    pub lines: Vec<LineCoverage>,
}

pub struct FakePackage {
    pub classes: Vec<FakeClass>,
}

pub struct FakeBundle {
    pub packages: Vec<FakePackage>,
}

impl ClassView for FakeClass {
    fn name(&self) -> &str {
        self.name
    }

    fn package_name(&self) -> &str {
        self.package_name
    }

    fn source_file_name(&self) -> Option<&str> {
        Some(self.source_file_name)
    }

    fn lines(&self) -> &[LineCoverage] {
        &self.lines
    }
}

impl PackageView for FakePackage {
    type Class = FakeClass;

    fn classes(&self) -> &[FakeClass] {
        &self.classes
    }
}

impl BundleView for FakeBundle {
    type Package = FakePackage;

    fn packages(&self) -> &[FakePackage] {
        &self.packages
    }
}

/// One package holding class `Foo` from `com/example/Foo.java`.
pub fn foo_bundle() -> FakeBundle {
    FakeBundle {
        packages: vec![FakePackage {
            classes: vec![FakeClass {
                name: "Foo",
                package_name: "com/example",
                source_file_name: "Foo.java",
                lines: vec![
                    LineCoverage {
                        line_number: 1,
                        hit_count: 1,
                    },
                    LineCoverage {
                        line_number: 2,
                        hit_count: 0,
                    },
                ],
            }],
        }],
    }
}
