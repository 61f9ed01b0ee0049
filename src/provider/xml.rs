//! Converts an XML response into the same JSON tree shape the provider's JSON format has.
//!
//! Elements with children become objects, leaf elements become strings and repeated
//! child elements become arrays. Attributes are ignored; the provider does not use them.

use crate::provider::error::ProviderError;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

struct Element {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn add_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    fn into_value(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            Value::String(self.text.trim().to_string())
        } else {
            Value::Object(self.children)
        };
        (self.name, value)
    }
}

pub(crate) fn xml_to_json(xml: &str) -> Result<Value, ProviderError> {
    // Text is trimmed per element rather than per event: entity references split text
    // events and the whitespace around them belongs to the value.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, name, Value::String(String::new()))?;
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let resolved = resolve_reference(&e).map_err(|message| {
                    ProviderError::Xml(format!("{message} at position {}", reader.buffer_position()))
                })?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&resolved);
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ProviderError::Xml("unbalanced closing tag".to_string()))?;
                let (name, value) = element.into_value();
                attach(&mut stack, &mut root, name, value)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ProviderError::Xml(format!(
                    "{e} at position {}",
                    reader.error_position()
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ProviderError::Xml(format!("unclosed element '{}'", open.name)));
    }
    let (name, value) = root.ok_or_else(|| ProviderError::Xml("empty document".to_string()))?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<(), ProviderError> {
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None if root.is_some() => {
            return Err(ProviderError::Xml(format!(
                "second root element '{name}'"
            )));
        }
        None => *root = Some((name, value)),
    }
    Ok(())
}

fn resolve_reference(reference: &BytesRef) -> Result<String, String> {
    if let Some(ch) = reference.resolve_char_ref().map_err(|e| e.to_string())? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(|e| e.to_string())?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| format!("unknown entity '&{name};'"))
}
