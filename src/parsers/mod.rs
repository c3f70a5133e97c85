pub mod jacoco;
pub mod json;

use std::borrow::Cow;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::BytesStart;
use quick_xml::Reader;

use crate::detect::Format;
use crate::error::{Error, Result};
use crate::model::Bundle;

/// Every analyzer report adapter implements this trait.
pub trait BundleParser {
    fn format(&self) -> Format;

    /// Whether this adapter recognizes the file by name or leading bytes.
    fn can_parse(&self, path: &Path, content: &[u8]) -> bool;

    /// Read a whole report into a [`Bundle`].
    fn parse_reader(&self, reader: &mut dyn BufRead) -> Result<Bundle>;

    fn parse(&self, input: &[u8]) -> Result<Bundle> {
        self.parse_reader(&mut &*input)
    }
}

/// All known adapters, in detection order.
pub fn all() -> [&'static dyn BundleParser; 2] {
    [&json::JsonParser, &jacoco::JacocoParser]
}

pub fn for_format(format: Format) -> &'static dyn BundleParser {
    match format {
        Format::Jacoco => &jacoco::JacocoParser,
        Format::Json => &json::JsonParser,
    }
}

/// First few KB of the content, for sniffing.
pub(crate) fn sniff_head(content: &[u8]) -> Cow<'_, str> {
    let head_len = content.len().min(4096);
    String::from_utf8_lossy(&content[..head_len])
}

pub(crate) fn looks_like_xml(head: &str) -> bool {
    head.contains("<?xml") || head.trim_start().starts_with('<')
}

pub(crate) fn xml_reader<R: BufRead>(reader: R) -> Reader<R> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);
    xml
}

pub(crate) fn xml_err<R>(source: quick_xml::Error, xml: &Reader<R>) -> Error {
    Error::Xml {
        source,
        position: xml.buffer_position(),
    }
}

/// Unescaped value of the named attribute, if present.
pub(crate) fn get_attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Numeric attribute, defaulting to zero when absent or malformed.
pub(crate) fn get_num<T: std::str::FromStr + Default>(e: &BytesStart<'_>, name: &[u8]) -> T {
    get_attr(e, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}
