//! Minimal owned XML tree.
//!
//! Feed dialects disagree on whether a field arrives as bare text, a node
//! with attributes, or a repeated node list. Building a small DOM first lets
//! every extraction site use the same two normalizations: coerce-to-text
//! ([`XmlElement::text`]) and coerce-to-list ([`XmlElement::children_named`]).

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::app::{Result, WeirError};

#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    /// Qualified name as written in the document, e.g. `dc:date`.
    pub name: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<XmlElement>,
    text: String,
    cdata: String,
}

impl XmlElement {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Name without the namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Namespace prefix, if the name carries one.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// First child whose local name matches.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    /// All children whose local name matches, in document order.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// Collapse this element to a single plain string: character data takes
    /// priority, then CDATA. Returns `None` when both are empty.
    pub fn text(&self) -> Option<String> {
        let text = self.text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
        let cdata = self.cdata.trim();
        if !cdata.is_empty() {
            return Some(cdata.to_string());
        }
        None
    }

    /// Text of the first matching child.
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local).and_then(XmlElement::text)
    }
}

/// Parse a document into its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Synthetic document node; the real root ends up as its only child.
    let mut stack = vec![XmlElement::named(String::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(element_from_start(e));
            }
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e);
                let parent = stack.last_mut().expect("document node present");
                parent.children.push(element);
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(WeirError::Xml("unexpected closing tag".to_string()));
                }
                let element = stack.pop().expect("checked above");
                let parent = stack.last_mut().expect("checked above");
                parent.children.push(element);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e);
                if let Some(current) = stack.last_mut() {
                    current.cdata.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(WeirError::Xml(e.to_string())),
        }
    }

    let document = stack.swap_remove(0);
    document
        .children
        .into_iter()
        .next()
        .ok_or_else(|| WeirError::Xml("empty document".to_string()))
}

fn element_from_start(e: &quick_xml::events::BytesStart<'_>) -> XmlElement {
    let mut element = XmlElement::named(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().unwrap_or_default().into_owned();
        element.attrs.insert(key, value);
    }
    element
}
