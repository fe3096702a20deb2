//! Streaming reader over a ClinVar full-release XML file.
//!
//! Yields one owned `ClinVarSet` subtree at a time. Nothing outside the
//! current set is kept, apart from the `ReleaseSet` attributes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use flate2::read::MultiGzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use clinyx_common::{ClinyxError, Result};

use crate::xml::XmlElement;

const CLINVAR_SET: &[u8] = b"ClinVarSet";
const RELEASE_SET: &[u8] = b"ReleaseSet";

/// Attributes of the document root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseInfo {
    /// `full` for a complete release
    pub kind: Option<String>,
    /// Release date, e.g. `2019-07-01`
    pub dated: Option<String>,
}

/// Open a release file, decompressing `.gz` transparently.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open ClinVar release {}", path.display()))?;
    let gzipped = path.extension().is_some_and(|ext| ext == "gz");
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub struct ClinVarSetReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    stack: Vec<XmlElement>,
    release: ReleaseInfo,
    done: bool,
}

impl<R: BufRead> ClinVarSetReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            stack: Vec::new(),
            release: ReleaseInfo::default(),
            done: false,
        }
    }

    /// Root attributes seen so far; complete once the first set has been read.
    pub fn release(&self) -> &ReleaseInfo {
        &self.release
    }
}

impl<'a> ClinVarSetReader<&'a [u8]> {
    pub fn from_xml(xml: &'a str) -> Self {
        ClinVarSetReader::new(xml.as_bytes())
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(ClinyxError::xml)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(ClinyxError::xml)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn capture_release(start: &BytesStart<'_>, release: &mut ReleaseInfo) -> Result<()> {
    let root = element_from(start)?;
    release.kind = root.attr("Type").map(str::to_string);
    release.dated = root.attr("Dated").map(str::to_string);
    Ok(())
}

/// Attach a finished element to its parent, or hand it back if it was the
/// top of the stack.
fn close(stack: &mut Vec<XmlElement>, element: XmlElement) -> Option<XmlElement> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            None
        }
        None => Some(element),
    }
}

impl<R: BufRead> Iterator for ClinVarSetReader<R> {
    type Item = Result<XmlElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    self.done = true;
                    let at = self.reader.buffer_position();
                    return Some(Err(ClinyxError::Xml(format!("{e} at byte {at}"))));
                }
            };
            match event {
                Event::Start(ref e) => {
                    if e.name().as_ref() == RELEASE_SET {
                        if let Err(err) = capture_release(e, &mut self.release) {
                            return Some(Err(err));
                        }
                    } else if !self.stack.is_empty() || e.name().as_ref() == CLINVAR_SET {
                        match element_from(e) {
                            Ok(element) => self.stack.push(element),
                            Err(err) => return Some(Err(err)),
                        }
                    }
                }
                Event::Empty(ref e) => {
                    if e.name().as_ref() == RELEASE_SET {
                        if let Err(err) = capture_release(e, &mut self.release) {
                            return Some(Err(err));
                        }
                    } else if !self.stack.is_empty() || e.name().as_ref() == CLINVAR_SET {
                        let element = match element_from(e) {
                            Ok(element) => element,
                            Err(err) => return Some(Err(err)),
                        };
                        if let Some(set) = close(&mut self.stack, element) {
                            return Some(Ok(set));
                        }
                    }
                }
                Event::Text(ref e) => {
                    if let Some(top) = self.stack.last_mut() {
                        match e.unescape() {
                            Ok(text) => top.text.push_str(&text),
                            Err(err) => return Some(Err(ClinyxError::xml(err))),
                        }
                    }
                }
                Event::CData(ref e) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Event::End(_) => {
                    if let Some(element) = self.stack.pop() {
                        if let Some(set) = close(&mut self.stack, element) {
                            return Some(Ok(set));
                        }
                    }
                }
                Event::Eof => {
                    self.done = true;
                    if !self.stack.is_empty() {
                        return Some(Err(ClinyxError::Xml(
                            "unexpected end of document inside ClinVarSet".to_string(),
                        )));
                    }
                    return None;
                }
                _ => {}
            }
        }
    }
}
