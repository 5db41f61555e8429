//! A minimal value/dictionary carrier, just expressive enough to describe an
//! encryption dictionary and to back [`crate::pdf_string::PdfString::write`].
//! This is not a document object model: no indirect references, no parser,
//! no writer for a full PDF body.

use crate::pdf_string::StringFormat;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Name(Vec<u8>),
    String(Vec<u8>, StringFormat),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary(Vec<(Vec<u8>, Value)>);

impl Dictionary {
    pub fn new() -> Self {
        Dictionary(Vec::new())
    }

    pub fn set<K: Into<Vec<u8>>>(&mut self, key: K, value: Value) {
        let key = key.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Vec<u8>, Value)> {
        self.0.iter()
    }
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            Value::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_string_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(bytes, _) => Some(bytes),
            _ => None,
        }
    }
}

/// Writes a name token (`/Name`), percent-encoding delimiters, whitespace
/// and non-printable bytes, matching the PDF 1.6 name escaping rules.
pub fn write_name(out: &mut Vec<u8>, name: &[u8]) {
    out.push(b'/');
    for &byte in name {
        if b" \t\n\r\x0C()<>[]{}/%#".contains(&byte) || byte < 33 || byte > 126 {
            out.extend(format!("#{byte:02X}").into_bytes());
        } else {
            out.push(byte);
        }
    }
}

pub fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Boolean(b) => out.extend(if *b { b"true".as_slice() } else { b"false".as_slice() }),
        Value::Integer(n) => out.extend(n.to_string().into_bytes()),
        Value::Name(name) => write_name(out, name),
        Value::String(bytes, format) => crate::pdf_string::write_string_literal(out, bytes, *format),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_value(out, item);
            }
            out.push(b']');
        }
        Value::Dictionary(dict) => write_dictionary(out, dict),
    }
}

pub fn write_dictionary(out: &mut Vec<u8>, dict: &Dictionary) {
    out.extend(b"<<");
    for (key, value) in dict.iter() {
        write_name(out, key);
        out.push(b' ');
        write_value(out, value);
    }
    out.extend(b">>");
}
