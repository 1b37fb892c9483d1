use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::InvoiceError;

fn xml_io(e: std::io::Error) -> InvoiceError {
    InvoiceError::Parse(format!("XML write error: {e}"))
}

fn parse_err(e: impl std::fmt::Display) -> InvoiceError {
    InvoiceError::Parse(format!("XML parse error: {e}"))
}

pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, InvoiceError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, InvoiceError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| InvoiceError::Parse(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, InvoiceError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, InvoiceError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, InvoiceError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    /// Self-closing element without content.
    pub fn empty_element(&mut self, name: &str) -> Result<&mut Self, InvoiceError> {
        self.writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, InvoiceError> {
        self.text_element_with_attrs(name, text, &[])
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, InvoiceError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write `text` only when present.
    pub fn opt_text_element(&mut self, name: &str, text: Option<&str>) -> Result<&mut Self, InvoiceError> {
        if let Some(text) = text {
            self.text_element(name, text)?;
        }
        Ok(self)
    }

    /// Write an element with an optional `schemeID`-style attribute.
    pub fn scheme_element(
        &mut self,
        name: &str,
        attr: &str,
        value: &str,
        scheme: Option<&str>,
    ) -> Result<&mut Self, InvoiceError> {
        match scheme {
            Some(scheme) => self.text_element_with_attrs(name, value, &[(attr, scheme)]),
            None => self.text_element(name, value),
        }
    }

    /// Write a decimal amount with currencyID attribute.
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<&mut Self, InvoiceError> {
        self.text_element_with_attrs(name, &format_decimal(amount), &[("currencyID", currency)])
    }

    /// Write a quantity with unitCode attribute.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
        unit: &str,
    ) -> Result<&mut Self, InvoiceError> {
        self.text_element_with_attrs(name, &format_decimal(qty), &[("unitCode", unit)])
    }
}

/// Format a Decimal for XML output: at least 2 decimal places, trailing
/// zeros beyond that stripped.
pub fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    match s.find('.') {
        Some(dot_pos) => {
            let decimals = s.len() - dot_pos - 1;
            if decimals < 2 {
                format!("{s}{}", "0".repeat(2 - decimals))
            } else {
                s
            }
        }
        None => format!("{s}.00"),
    }
}

/// Parsed element: local name (namespace prefix dropped), attributes,
/// concatenated text and child elements in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Descend through first matching children along `path`.
    pub fn find(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Text of the node at `path`, if that node exists.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.find(path).map(|n| n.text.as_str())
    }

    /// Owned text of the node at `path`.
    pub fn string_at(&self, path: &[&str]) -> Option<String> {
        self.text_at(path).map(String::from)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn local_name(qname: &[u8]) -> Result<String, InvoiceError> {
    let local = match qname.iter().rposition(|b| *b == b':') {
        Some(i) => &qname[i + 1..],
        None => qname,
    };
    std::str::from_utf8(local).map(String::from).map_err(parse_err)
}

fn open_node(e: &BytesStart<'_>) -> Result<XmlNode, InvoiceError> {
    let mut node = XmlNode {
        name: local_name(e.name().as_ref())?,
        ..Default::default()
    };
    for attr in e.attributes() {
        let attr = attr.map_err(parse_err)?;
        let key = attr.key.as_ref();
        // Namespace declarations carry no business data
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attr.unescape_value().map_err(parse_err)?;
        node.attributes.push((local_name(key)?, value.into_owned()));
    }
    Ok(node)
}

/// Parse a complete document into its root element.
pub fn parse_tree(xml: &str) -> Result<XmlNode, InvoiceError> {
    // Text is kept verbatim; indentation between elements is dropped
    // when the enclosing element closes.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    let mut close = |node: XmlNode, stack: &mut Vec<XmlNode>| -> Result<(), InvoiceError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => root = Some(node),
            None => return Err(InvoiceError::Parse("content after the root element".into())),
        }
        Ok(())
    };

    loop {
        match reader.read_event().map_err(parse_err)? {
            Event::Start(ref e) => stack.push(open_node(e)?),
            Event::Empty(ref e) => {
                let node = open_node(e)?;
                close(node, &mut stack)?;
            }
            Event::End(_) => {
                let mut node = stack
                    .pop()
                    .ok_or_else(|| InvoiceError::Parse("unbalanced end tag".into()))?;
                if !node.children.is_empty() && node.text.trim().is_empty() {
                    node.text.clear();
                }
                close(node, &mut stack)?;
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(parse_err)?;
                match stack.last_mut() {
                    Some(node) => node.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(InvoiceError::Parse("text outside the root element".into())),
                }
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e).map_err(parse_err)?.to_string();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(InvoiceError::Parse("unexpected end of document".into()));
    }
    root.ok_or_else(|| InvoiceError::Parse("document has no root element".into()))
}
