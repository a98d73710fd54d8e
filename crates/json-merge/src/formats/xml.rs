//! XML mapped onto JSON objects.
//!
//! ```text
//! <?xml version="1.0"?>          {"?xml": {"@_version": "1.0"},
//! <cfg env="prod">                 "cfg": {"@_env": "prod",
//!   <port>8080</port>                "port": 8080,
//!   <host>a</host>                   "host": ["a", "b"]}}
//!   <host>b</host>
//! </cfg>
//! ```
//!
//! Attributes become `@_`-prefixed keys, repeated child elements become
//! arrays, and text next to attributes or children is stored under `#text`.
//! Element text that reads as a number or boolean is converted; attribute
//! values stay strings.

use std::borrow::Cow;

use indexmap::IndexMap;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Number, Value};

use super::{Codec, DocType};
use crate::error::{ParseError, Result};

pub const ATTRIBUTE_PREFIX: &str = "@_";
pub const TEXT_KEY: &str = "#text";
pub const DECLARATION_KEY: &str = "?xml";

/// Element name used when a non-object value is exported.
const FALLBACK_ROOT: &str = "root";

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl Codec for XmlCodec {
    fn doc_type(&self) -> DocType {
        DocType::Xml
    }

    fn parse(&self, text: &str) -> Result<Value> {
        parse_xml(text)
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        build_xml(value)
    }
}

fn xml_err(e: impl std::fmt::Display) -> ParseError {
    ParseError::codec(DocType::Xml, e)
}

// ── Reading ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Element {
    name: String,
    attributes: Map<String, Value>,
    children: IndexMap<String, Vec<Value>>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Element::default()
        };
        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            let key = String::from_utf8_lossy(attr.key.as_ref());
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(xml_err)?;
            element.attributes.insert(
                format!("{ATTRIBUTE_PREFIX}{key}"),
                Value::String(value.into_owned()),
            );
        }
        Ok(element)
    }

    fn push_child(&mut self, name: String, value: Value) {
        self.children.entry(name).or_default().push(value);
    }

    fn finish(self) -> (String, Value) {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, text_value(text));
        }
        let mut map = self.attributes;
        for (name, mut values) in self.children {
            let value = if values.len() == 1 {
                values.pop().unwrap_or(Value::Null)
            } else {
                Value::Array(values)
            };
            map.insert(name, value);
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_owned(), text_value(text));
        }
        (self.name, Value::Object(map))
    }
}

/// Convert element text, turning plain decimal numbers and `true`/`false`
/// into JSON scalars. Numbers with leading zeros stay strings.
fn text_value(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    let digits = text.strip_prefix('-').unwrap_or(text);
    let leading_zero = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    let numeric = !digits.is_empty()
        && digits.starts_with(|c: char| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if numeric && !leading_zero {
        if let Ok(n) = text.parse::<i64>() {
            return Value::from(n);
        }
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(text.to_owned())
}

fn declaration(decl: &BytesDecl<'_>) -> Result<Value> {
    let mut map = Map::new();
    let version = decl.version().map_err(xml_err)?;
    map.insert(
        format!("{ATTRIBUTE_PREFIX}version"),
        Value::String(String::from_utf8_lossy(&version).into_owned()),
    );
    if let Some(encoding) = decl.encoding() {
        let encoding = encoding.map_err(xml_err)?;
        map.insert(
            format!("{ATTRIBUTE_PREFIX}encoding"),
            Value::String(String::from_utf8_lossy(&encoding).into_owned()),
        );
    }
    if let Some(standalone) = decl.standalone() {
        let standalone = standalone.map_err(xml_err)?;
        map.insert(
            format!("{ATTRIBUTE_PREFIX}standalone"),
            Value::String(String::from_utf8_lossy(&standalone).into_owned()),
        );
    }
    Ok(Value::Object(map))
}

fn parse_xml(text: &str) -> Result<Value> {
    let mut reader = Reader::from_str(text);
    let mut document = Element::default();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let event = reader.read_event().map_err(xml_err)?;
        match event {
            Event::Decl(decl) => {
                document.push_child(DECLARATION_KEY.to_owned(), declaration(&decl)?);
            }
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Element::open(&start)?.finish();
                stack.last_mut().unwrap_or(&mut document).push_child(name, value);
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(xml_err("unexpected closing tag"));
                };
                let (name, value) = element.finish();
                stack.last_mut().unwrap_or(&mut document).push_child(name, value);
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&t);
                    top.text.push_str(&unescape(&raw).map_err(xml_err)?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&resolve_reference(&reference)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_err(format!("unclosed element <{}>", open.name)));
    }
    let (_, value) = document.finish();
    match value {
        Value::Object(map) => Ok(Value::Object(map)),
        _ => Err(xml_err("document has no root element")),
    }
}

fn resolve_reference(reference: &quick_xml::events::BytesRef<'_>) -> Result<Cow<'static, str>> {
    if let Some(c) = reference.resolve_char_ref().map_err(xml_err)? {
        return Ok(Cow::Owned(c.to_string()));
    }
    let name = String::from_utf8_lossy(reference);
    resolve_predefined_entity(&name)
        .map(Cow::Borrowed)
        .ok_or_else(|| xml_err(format!("unknown entity &{name};")))
}

// ── Writing ─────────────────────────────────────────────────────────────

fn build_xml(value: &Value) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(decl)) = map.get(DECLARATION_KEY) {
                write_declaration(&mut writer, decl)?;
            }
            for (name, child) in map {
                if name == DECLARATION_KEY {
                    continue;
                }
                write_element(&mut writer, name, child)?;
            }
        }
        other => write_element(&mut writer, FALLBACK_ROOT, other)?,
    }
    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn write_declaration(writer: &mut Writer<Vec<u8>>, decl: &Map<String, Value>) -> Result<()> {
    let attr = |name: &str| {
        decl.get(&format!("{ATTRIBUTE_PREFIX}{name}"))
            .map(scalar_text)
    };
    let version = attr("version").unwrap_or_else(|| "1.0".to_owned());
    let encoding = attr("encoding");
    let standalone = attr("standalone");
    let event = BytesDecl::new(&version, encoding.as_deref(), standalone.as_deref());
    writer.write_event(Event::Decl(event)).map_err(xml_err)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            let mut start = BytesStart::new(name);
            for (key, attr) in map {
                if let Some(attr_name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    start.push_attribute((attr_name, scalar_text(attr).as_str()));
                }
            }
            let text = map.get(TEXT_KEY).map(scalar_text).unwrap_or_default();
            let children: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(k, _)| !k.starts_with(ATTRIBUTE_PREFIX) && k.as_str() != TEXT_KEY)
                .collect();

            writer.write_event(Event::Start(start)).map_err(xml_err)?;
            if !text.is_empty() {
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(xml_err)?;
            }
            for (child_name, child) in children {
                write_element(writer, child_name, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)
        }
        scalar => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_err)?;
            let text = scalar_text(scalar);
            if !text.is_empty() {
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(xml_err)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)
        }
    }
}
