//! Owned element tree for one `ClinVarSet`, with a small path query.
//!
//! Paths are `/`-separated child steps relative to the element, each step a
//! tag name optionally followed by one attribute test: `Tag[@Attr]` or
//! `Tag[@Attr="value"]`.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use clinyx_common::{ClinyxError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

struct Step<'p> {
    name: &'p str,
    attr: Option<(&'p str, Option<&'p str>)>,
}

impl<'p> Step<'p> {
    fn parse(segment: &'p str) -> Self {
        match segment.split_once("[@") {
            Some((name, predicate)) => {
                let predicate = predicate.trim_end_matches(']');
                let attr = match predicate.split_once('=') {
                    Some((key, value)) => (key, Some(value.trim_matches('"'))),
                    None => (predicate, None),
                };
                Step { name, attr: Some(attr) }
            }
            None => Step { name: segment, attr: None },
        }
    }

    fn matches(&self, element: &XmlElement) -> bool {
        if element.name != self.name {
            return false;
        }
        match self.attr {
            None => true,
            Some((key, None)) => element.attr(key).is_some(),
            Some((key, Some(value))) => element.attr(key) == Some(value),
        }
    }
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// All descendants reached by `path`, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&XmlElement> {
        let mut frontier = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            let step = Step::parse(segment);
            frontier = frontier
                .into_iter()
                .flat_map(|e| e.children.iter())
                .filter(|child| step.matches(child))
                .collect();
            if frontier.is_empty() {
                break;
            }
        }
        frontier
    }

    /// First descendant reached by `path`.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.find_all(path).into_iter().next()
    }

    /// Text of the first element reached by `path`.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(XmlElement::text)
    }

    // ── Serialisation ─────────────────────────────────────────────────────────

    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let start = BytesStart::new(self.name.as_str()).with_attributes(
            self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        if self.children.is_empty() && self.text.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(ClinyxError::xml)?;
            return Ok(());
        }
        writer.write_event(Event::Start(start)).map_err(ClinyxError::xml)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(ClinyxError::xml)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(ClinyxError::xml)?;
        Ok(())
    }

    /// Compact single-line XML for this subtree.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(ClinyxError::xml)
    }
}
