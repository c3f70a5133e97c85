/// LCOV tracefile writer.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Records written per source file, in order:
///   TN:<test name>                       (optional)
///   SF:<path>
///   FN:<line>,<function name>
///   FNDA:<execution count>,<function name>
///   FNF:<number of functions found>
///   FNH:<number of functions hit>
///   BRDA:<line>,<block>,<branch>,<taken>   ("-" when the line never ran)
///   BRF:<branches found>
///   BRH:<branches hit>
///   DA:<line number>,<execution count>
///   LH:<lines hit>
///   LF:<lines found>
///   end_of_record
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::io::Write;

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{BundleView, ClassView, PackageView};
use crate::resolve::PathResolver;

/// Counts from one emission pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub classes_seen: usize,
    pub classes_resolved: usize,
    pub records_written: usize,
}

/// Walks a bundle and writes one LCOV block per resolved source path.
pub struct LcovEmitter<'r, W: Write> {
    resolver: &'r PathResolver,
    out: W,
    test_name: Option<String>,
}

impl<'r, W: Write> LcovEmitter<'r, W> {
    pub fn new(resolver: &'r PathResolver, out: W) -> Self {
        Self {
            resolver,
            out,
            test_name: None,
        }
    }

    /// Prefix every block with a `TN:` record.
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    /// Run one pass over `bundle`.
    ///
    /// Classes whose path does not resolve produce no output. Blocks are
    /// rendered in memory and written whole, in order of first appearance.
    pub fn emit<B: BundleView>(&mut self, bundle: &B) -> Result<EmitSummary> {
        let resolver = self.resolver;
        let mut summary = EmitSummary::default();
        let mut cache: HashMap<(&str, &str), Option<&'r str>> = HashMap::new();
        let mut records: Vec<SourceRecord<'_, _>> = Vec::new();
        let mut by_path: HashMap<&'r str, usize> = HashMap::new();

        for package in bundle.packages() {
            for class in package.classes() {
                summary.classes_seen += 1;

                let resolved = match class.source_file_name() {
                    Some(file) => *cache
                        .entry((class.package_name(), file))
                        .or_insert_with(|| {
                            debug!(package = class.package_name(), file, "resolving source path");
                            resolver.resolve(class.package_name(), file)
                        }),
                    None => None,
                };

                let Some(path) = resolved else {
                    debug!(class = class.name(), "no declared path, skipping class");
                    continue;
                };

                summary.classes_resolved += 1;
                let idx = *by_path.entry(path).or_insert_with(|| {
                    records.push(SourceRecord {
                        path,
                        classes: Vec::new(),
                    });
                    records.len() - 1
                });
                records[idx].classes.push(class);
            }
        }

        for record in &records {
            let block = record.render(self.test_name.as_deref());
            self.out.write_all(block.as_bytes())?;
            summary.records_written += 1;
        }
        self.out.flush()?;

        info!(
            classes = summary.classes_seen,
            resolved = summary.classes_resolved,
            records = summary.records_written,
            "lcov pass complete"
        );
        Ok(summary)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render a whole bundle to a string.
pub fn format_lcov<B: BundleView>(resolver: &PathResolver, bundle: &B) -> Result<String> {
    let mut emitter = LcovEmitter::new(resolver, Vec::new());
    emitter.emit(bundle)?;
    Ok(String::from_utf8_lossy(&emitter.into_inner()).into_owned())
}

/// All classes that resolved to one declared path.
struct SourceRecord<'a, C> {
    path: &'a str,
    classes: Vec<&'a C>,
}

impl<C: ClassView> SourceRecord<'_, C> {
    fn render(&self, test_name: Option<&str>) -> String {
        // Nested classes share a source file; merge their data by position.
        let mut lines: BTreeMap<u32, u64> = BTreeMap::new();
        let mut branches: BTreeMap<(u32, u32), u64> = BTreeMap::new();
        let mut functions: Vec<(Option<u32>, String, u64)> = Vec::new();

        for class in &self.classes {
            for line in class.lines() {
                let hits = lines.entry(line.line_number).or_insert(0);
                *hits = (*hits).max(line.hit_count);
            }
            for branch in class.branches() {
                let hits = branches
                    .entry((branch.line_number, branch.branch_index))
                    .or_insert(0);
                *hits = (*hits).max(branch.hit_count);
            }
            for method in class.methods() {
                let name = function_name(class.name(), &method.name, &method.descriptor);
                if functions.iter().any(|(_, existing, _)| *existing == name) {
                    continue;
                }
                functions.push((method.first_line.filter(|&l| l > 0), name, method.hit_count));
            }
        }

        let mut out = String::new();
        if let Some(name) = test_name {
            writeln!(out, "TN:{name}").unwrap();
        }
        writeln!(out, "SF:{}", self.path).unwrap();

        if !functions.is_empty() {
            // LCOV lines start at 1; methods without a line get no FN record.
            for (line, name, _) in &functions {
                if let Some(line) = line {
                    writeln!(out, "FN:{line},{name}").unwrap();
                }
            }
            for (_, name, hits) in &functions {
                writeln!(out, "FNDA:{hits},{name}").unwrap();
            }
            let hit = functions.iter().filter(|(_, _, hits)| *hits > 0).count();
            writeln!(out, "FNF:{}", functions.len()).unwrap();
            writeln!(out, "FNH:{hit}").unwrap();
        }

        if !branches.is_empty() {
            let mut hit = 0;
            for (&(line, index), &hits) in &branches {
                // Only a line known to have run zero times marks its arms `-`.
                if lines.get(&line) == Some(&0) {
                    writeln!(out, "BRDA:{line},0,{index},-").unwrap();
                } else {
                    writeln!(out, "BRDA:{line},0,{index},{hits}").unwrap();
                    if hits > 0 {
                        hit += 1;
                    }
                }
            }
            writeln!(out, "BRF:{}", branches.len()).unwrap();
            writeln!(out, "BRH:{hit}").unwrap();
        }

        for (line, hits) in &lines {
            writeln!(out, "DA:{line},{hits}").unwrap();
        }
        let hit = lines.values().filter(|&&hits| hits > 0).count();
        writeln!(out, "LH:{hit}").unwrap();
        writeln!(out, "LF:{}", lines.len()).unwrap();
        out.push_str("end_of_record\n");
        out
    }
}

/// `com/example/Foo`, `bar`, `()V` → `com.example.Foo::bar()V`.
fn function_name(class_name: &str, method_name: &str, descriptor: &str) -> String {
    format!("{}::{method_name}{descriptor}", class_name.replace('/', "."))
}
