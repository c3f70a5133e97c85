use std::io::Write;

use jacov::convert::{convert, ConvertOptions};
use jacov::detect::Format;

const FIXTURE: &[u8] = include_bytes!("fixtures/sample_jacoco.xml");

/// Full pipeline: JaCoCo XML on disk + path list on disk → LCOV.
#[test]
fn convert_jacoco_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("jacoco.xml");
    std::fs::File::create(&report).unwrap().write_all(FIXTURE).unwrap();

    let paths = dir.path().join("paths.txt");
    std::fs::write(
        &paths,
        "\
# sources known to the build
/work/src/main/java/com/example/Foo.java
/checkout/Bar.java///bazel-out/bin/com/example/Bar.java
/work/src/main/java/com/other/Unused.java
",
    )
    .unwrap();

    let mut out = Vec::new();
    let (format, summary) =
        convert(&report, None, &paths, &ConvertOptions::default(), &mut out).unwrap();
    let lcov = String::from_utf8(out).unwrap();

    assert_eq!(format, Format::Jacoco);
    assert_eq!(summary.classes_seen, 4);
    // Foo, Foo$Inner and Bar resolve; the generated stub has no source file.
    assert_eq!(summary.classes_resolved, 3);
    assert_eq!(summary.records_written, 2);

    assert_eq!(
        lcov,
        "\
SF:/work/src/main/java/com/example/Foo.java
FN:3,com.example.Foo::<init>()V
FN:10,com.example.Foo::doStuff(I)V
FN:15,com.example.Foo$Inner::run()V
FNDA:1,com.example.Foo::<init>()V
FNDA:1,com.example.Foo::doStuff(I)V
FNDA:0,com.example.Foo$Inner::run()V
FNF:3
FNH:2
BRDA:11,0,0,1
BRDA:11,0,1,0
BRF:2
BRH:1
DA:3,1
DA:10,1
DA:11,1
DA:12,0
DA:15,1
LH:4
LF:5
end_of_record
SF:/checkout/Bar.java
FN:1,com.example.Bar::<init>()V
FNDA:1,com.example.Bar::<init>()V
FNF:1
FNH:1
DA:1,1
DA:2,0
LH:1
LF:2
end_of_record
"
    );
    assert!(!lcov.contains("bazel-out"));
}

#[test]
fn convert_with_no_matching_paths_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("jacoco.xml");
    std::fs::write(&report, FIXTURE).unwrap();
    let paths = dir.path().join("paths.txt");
    std::fs::write(&paths, "/path/does/not/match/anything.txt\n").unwrap();

    let mut out = Vec::new();
    let (_format, summary) =
        convert(&report, None, &paths, &ConvertOptions::default(), &mut out).unwrap();

    assert!(out.is_empty());
    assert_eq!(summary.records_written, 0);
}

#[test]
fn convert_json_bundle_with_options() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("bundle.json");
    std::fs::write(
        &report,
        r#"{"packages":[{"name":"com/example","classes":[
            {"name":"com/example/Foo","package_name":"com/example","source_file_name":"Foo.java",
             "lines":[{"line_number":7,"hit_count":3}]}
        ]}]}"#,
    )
    .unwrap();
    let paths = dir.path().join("paths.txt");
    std::fs::write(&paths, "/real/Foo.java=>com/example/Foo.java\n").unwrap();

    let options = ConvertOptions {
        delimiter: "=>".to_string(),
        test_name: Some("unit".to_string()),
    };
    let mut out = Vec::new();
    let (format, _summary) = convert(&report, None, &paths, &options, &mut out).unwrap();

    assert_eq!(format, Format::Json);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "TN:unit\nSF:/real/Foo.java\nDA:7,3\nLH:1\nLF:1\nend_of_record\n"
    );
}

#[test]
fn convert_with_format_override() {
    let dir = tempfile::tempdir().unwrap();
    // No extension hint and no XML declaration sniffing needed: forced.
    let report = dir.path().join("coverage.dat");
    std::fs::write(&report, FIXTURE).unwrap();
    let paths = dir.path().join("paths.txt");
    std::fs::write(&paths, "").unwrap();

    let mut out = Vec::new();
    let (format, summary) = convert(
        &report,
        Some("jacoco"),
        &paths,
        &ConvertOptions::default(),
        &mut out,
    )
    .unwrap();

    assert_eq!(format, Format::Jacoco);
    assert_eq!(summary.classes_resolved, 0);
    assert!(out.is_empty());
}

#[test]
fn convert_malformed_report_fails() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("jacoco.xml");
    std::fs::write(
        &report,
        "<?xml version=\"1.0\"?><report name=\"x\"><package name=\"a\"></report>",
    )
    .unwrap();
    let paths = dir.path().join("paths.txt");
    std::fs::write(&paths, "/src/a/B.java\n").unwrap();

    let mut out = Vec::new();
    let result = convert(&report, None, &paths, &ConvertOptions::default(), &mut out);
    assert!(matches!(result, Err(jacov::error::Error::Xml { .. })));
    assert!(out.is_empty());
}
