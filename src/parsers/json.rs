/// Adapter for bundles serialized as JSON by the analyzer side.
///
/// Shape:
///   {
///     "packages": [
///       {
///         "name": "com/example",
///         "classes": [
///           {
///             "name": "com/example/Foo",
///             "package_name": "com/example",
///             "source_file_name": "Foo.java",
///             "lines": [{ "line_number": 3, "hit_count": 1 }],
///             "branches": [{ "line_number": 3, "branch_index": 0, "hit_count": 1 }],
///             "methods": [{ "name": "run", "descriptor": "()V", "first_line": 3, "hit_count": 1 }]
///           }
///         ]
///       }
///     ]
///   }
use std::io::BufRead;
use std::path::Path;

use super::BundleParser;
use crate::detect::Format;
use crate::error::Result;
use crate::model::Bundle;

pub struct JsonParser;

impl BundleParser for JsonParser {
    fn format(&self) -> Format {
        Format::Json
    }

    fn can_parse(&self, path: &Path, content: &[u8]) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if ext.eq_ignore_ascii_case("json") {
                return true;
            }
        }
        let head = super::sniff_head(content);
        head.trim_start().starts_with('{') && head.contains("\"packages\"")
    }

    fn parse_reader(&self, reader: &mut dyn BufRead) -> Result<Bundle> {
        Ok(serde_json::from_reader(reader)?)
    }
}
