/// Adapter for JaCoCo XML coverage reports.
///
/// JaCoCo XML structure:
///   <report name="...">
///     <sessioninfo id="..." start="..." dump="..."/>
///     <package name="com/example">
///       <class name="com/example/Foo" sourcefilename="Foo.java">
///         <method name="doStuff" desc="()V" line="10">
///           <counter type="INSTRUCTION" missed="0" covered="5"/>
///           <counter type="METHOD" missed="0" covered="1"/>
///         </method>
///         <counter type="LINE" missed="1" covered="5"/>
///       </class>
///       <sourcefile name="Foo.java">
///         <line nr="10" mi="0" ci="3" mb="0" cb="2"/>
///         <line nr="11" mi="0" ci="5" mb="1" cb="1"/>
///         <counter type="LINE" missed="1" covered="5"/>
///       </sourcefile>
///     </package>
///   </report>
///
/// Classes keep the names JaCoCo reports. Line data lives in `<sourcefile>`
/// elements, which come after the classes of a package, so each class picks
/// up the lines of its source file once the package closes. JaCoCo has no
/// execution counts: a line with any covered instruction counts as one hit.
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event;
use tracing::warn;

use super::{get_attr, get_num, BundleParser};
use crate::detect::Format;
use crate::error::Result;
use crate::model::*;

/// Upper bound on branch arms accepted for a single line.
const MAX_BRANCHES_PER_LINE: u32 = 1024;

/// JaCoCo XML format adapter.
pub struct JacocoParser;

impl BundleParser for JacocoParser {
    fn format(&self) -> Format {
        Format::Jacoco
    }

    fn can_parse(&self, _path: &Path, content: &[u8]) -> bool {
        let head = super::sniff_head(content);
        super::looks_like_xml(&head)
            && head.contains("<report")
            && (head.contains("jacoco") || head.contains("JACOCO") || head.contains("<package"))
    }

    fn parse_reader(&self, reader: &mut dyn BufRead) -> Result<Bundle> {
        parse_reader(reader)
    }
}

/// Lines and branches of one `<sourcefile>`.
#[derive(Default)]
struct SourceLines {
    lines: Vec<LineCoverage>,
    branches: Vec<BranchCoverage>,
}

fn parse_reader(reader: &mut dyn BufRead) -> Result<Bundle> {
    let mut xml = super::xml_reader(reader);
    let mut buf = Vec::new();
    let mut bundle = Bundle::new();

    let mut current_package: Option<PackageCoverage> = None;
    let mut sources: HashMap<String, SourceLines> = HashMap::new();
    let mut current_source: Option<String> = None;
    let mut current_class: Option<ClassCoverage> = None;
    let mut current_method: Option<MethodCoverage> = None;

    loop {
        let event = xml.read_event_into(&mut buf);
        let is_start_event = matches!(&event, Ok(Event::Start(_)));
        match event {
            Err(e) => return Err(super::xml_err(e, &xml)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"package" => {
                    let name = get_attr(e, b"name").unwrap_or_default();
                    current_package = Some(PackageCoverage::new(&name));
                    sources.clear();
                }
                b"class" => {
                    let package_name = current_package
                        .as_ref()
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    let class = ClassCoverage {
                        name: get_attr(e, b"name").unwrap_or_default(),
                        package_name,
                        source_file_name: get_attr(e, b"sourcefilename"),
                        ..Default::default()
                    };
                    if is_start_event {
                        current_class = Some(class);
                    } else {
                        push_class(&mut current_package, class);
                    }
                }
                b"method" if current_class.is_some() => {
                    let method = MethodCoverage {
                        name: get_attr(e, b"name").unwrap_or_default(),
                        descriptor: get_attr(e, b"desc").unwrap_or_default(),
                        first_line: get_attr(e, b"line").and_then(|v| v.parse().ok()),
                        hit_count: 0,
                    };
                    if is_start_event {
                        current_method = Some(method);
                    } else if let Some(class) = current_class.as_mut() {
                        class.methods.push(method);
                    }
                }
                b"counter" => {
                    if let Some(method) = current_method.as_mut() {
                        if get_attr(e, b"type").as_deref() == Some("METHOD") {
                            let covered: u64 = get_num(e, b"covered");
                            method.hit_count = u64::from(covered > 0);
                        }
                    }
                }
                b"sourcefile" if is_start_event => {
                    current_source = get_attr(e, b"name");
                }
                b"line" => {
                    if let Some(name) = &current_source {
                        let source = sources.entry(name.clone()).or_default();
                        push_line(source, e);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"method" => {
                    if let (Some(method), Some(class)) = (current_method.take(), current_class.as_mut()) {
                        class.methods.push(method);
                    }
                }
                b"class" => {
                    if let Some(class) = current_class.take() {
                        push_class(&mut current_package, class);
                    }
                }
                b"sourcefile" => {
                    current_source = None;
                }
                b"package" => {
                    if let Some(mut package) = current_package.take() {
                        attach_sources(&mut package, &sources);
                        bundle.packages.push(package);
                    }
                    sources.clear();
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    // Handle unclosed package
    if let Some(mut package) = current_package.take() {
        attach_sources(&mut package, &sources);
        bundle.packages.push(package);
    }

    Ok(bundle)
}

fn push_class(package: &mut Option<PackageCoverage>, class: ClassCoverage) {
    if let Some(package) = package.as_mut() {
        package.classes.push(class);
    }
}

fn push_line(source: &mut SourceLines, e: &quick_xml::events::BytesStart<'_>) {
    let Some(line_number) = get_attr(e, b"nr").and_then(|v| v.parse::<u32>().ok()) else {
        return;
    };
    let ci: u64 = get_num(e, b"ci");
    let mi: u64 = get_num(e, b"mi");
    let cb: u32 = get_num(e, b"cb");
    let mb: u32 = get_num(e, b"mb");

    // Lines without instructions are comments or blank lines.
    if ci > 0 || mi > 0 {
        source.lines.push(LineCoverage {
            line_number,
            hit_count: u64::from(ci > 0),
        });
    }

    let arms = cb.saturating_add(mb);
    if arms > MAX_BRANCHES_PER_LINE {
        warn!(line = line_number, arms, "implausible branch count, dropping branches");
        return;
    }
    for branch_index in 0..arms {
        source.branches.push(BranchCoverage {
            line_number,
            branch_index,
            hit_count: u64::from(branch_index < cb),
        });
    }
}

fn attach_sources(package: &mut PackageCoverage, sources: &HashMap<String, SourceLines>) {
    for class in &mut package.classes {
        let Some(source) = class.source_file_name.as_ref().and_then(|name| sources.get(name)) else {
            continue;
        };
        class.lines = source.lines.clone();
        class.lines.sort_by_key(|l| l.line_number);
        class.branches = source.branches.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jacoco() {
        let input = include_bytes!("../../tests/fixtures/sample_jacoco.xml");
        let bundle = JacocoParser.parse(input).unwrap();

        assert_eq!(bundle.packages.len(), 2);
        let example = &bundle.packages[0];
        assert_eq!(example.name, "com/example");
        assert_eq!(example.classes.len(), 3);

        let foo = &example.classes[0];
        assert_eq!(foo.name, "com/example/Foo");
        assert_eq!(foo.package_name, "com/example");
        assert_eq!(foo.source_file_name.as_deref(), Some("Foo.java"));

        // Line 13 is blank (no instructions) and is dropped.
        let numbers: Vec<u32> = foo.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![3, 10, 11, 12, 15]);
        assert_eq!(foo.lines[0].hit_count, 1); // ci=3
        assert_eq!(foo.lines[3].hit_count, 0); // ci=0, mi=2 → missed

        // Branch on line 11: cb=1, mb=1 → 2 branch arms
        assert_eq!(foo.branches.len(), 2);
        assert_eq!(foo.branches[0].line_number, 11);
        assert_eq!(foo.branches[0].hit_count, 1);
        assert_eq!(foo.branches[1].branch_index, 1);
        assert_eq!(foo.branches[1].hit_count, 0);

        assert_eq!(foo.methods.len(), 2);
        assert_eq!(foo.methods[0].name, "<init>");
        assert_eq!(foo.methods[0].first_line, Some(3));
        assert_eq!(foo.methods[1].name, "doStuff");
        assert_eq!(foo.methods[1].descriptor, "(I)V");
        assert_eq!(foo.methods[1].hit_count, 1);

        // Inner class shares Foo.java.
        let inner = &example.classes[1];
        assert_eq!(inner.name, "com/example/Foo$Inner");
        assert_eq!(inner.lines.len(), foo.lines.len());
        assert_eq!(inner.methods[0].hit_count, 0);

        let bar = &example.classes[2];
        assert_eq!(bar.source_file_name.as_deref(), Some("Bar.java"));
        assert_eq!(bar.lines.len(), 2);
        assert!(bar.branches.is_empty());

        let generated = &bundle.packages[1].classes[0];
        assert_eq!(generated.package_name, "com/example/gen");
        assert_eq!(generated.source_file_name, None);
        assert!(generated.lines.is_empty());
    }

    #[test]
    fn test_parse_jacoco_huge_branch_counts() {
        let input = br#"<?xml version="1.0"?>
<report name="x">
  <package name="a">
    <class name="a/B" sourcefilename="B.java"/>
    <sourcefile name="B.java">
      <line nr="1" mi="0" ci="1" mb="4294967295" cb="4294967295"/>
      <line nr="2" mi="0" ci="1" mb="1" cb="1"/>
    </sourcefile>
  </package>
</report>"#;
        let bundle = JacocoParser.parse(input).unwrap();
        let class = &bundle.packages[0].classes[0];

        // The line itself is kept; only its branch arms are dropped.
        assert_eq!(class.lines.len(), 2);
        assert_eq!(class.branches.len(), 2);
        assert!(class.branches.iter().all(|b| b.line_number == 2));
    }

    #[test]
    fn test_parse_jacoco_empty() {
        let input = br#"<?xml version="1.0" encoding="UTF-8"?><report name="empty"></report>"#;
        let bundle = JacocoParser.parse(input).unwrap();
        assert!(bundle.packages.is_empty());
    }

    #[test]
    fn test_parse_jacoco_malformed() {
        let input = br#"<?xml version="1.0"?><report name="x"><package name="a"><class name="a/B"></package></report>"#;
        let result = JacocoParser.parse(input);
        assert!(result.is_err());
        let err_msg = format!("{}", result.unwrap_err());
        assert!(
            err_msg.contains("position"),
            "Error should contain position info: {err_msg}",
        );
    }

    #[test]
    fn test_can_parse_jacoco() {
        let parser = JacocoParser;

        let content = br#"<?xml version="1.0" encoding="UTF-8"?><!DOCTYPE report PUBLIC "-//JACOCO//DTD Report 1.1//EN" "report.dtd"><report name="test">"#;
        assert!(parser.can_parse(Path::new("jacoco.xml"), content));

        let content = br#"<?xml version="1.0"?><report name="test"><package name="com/example">"#;
        assert!(parser.can_parse(Path::new("report.xml"), content));

        // Cobertura should NOT match
        let content = br#"<?xml version="1.0"?><coverage version="1.0">"#;
        assert!(!parser.can_parse(Path::new("coverage.xml"), content));
    }
}
