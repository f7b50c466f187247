//! Wikidot page metadata (`meta/<fullname>.xml`).

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::MetadataError;

/// Identity of a page as recorded in its metadata file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageMeta {
    /// Page fullname, e.g. `system:join`.
    pub fullname: String,
    /// Human-readable title.
    pub title: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Element {
    Data,
    Fullname,
    Title,
    Other,
}

#[derive(Default)]
struct Field {
    count: usize,
    text: String,
}

impl Field {
    fn into_value(self, element: &'static str) -> Result<String, MetadataError> {
        if self.count != 1 {
            return Err(MetadataError::ElementCount {
                element,
                count: self.count,
            });
        }
        Ok(self.text.trim().to_owned())
    }
}

impl PageMeta {
    /// Parse a metadata document.
    ///
    /// The document must contain exactly one `<data>` element, which in turn
    /// contains exactly one `<fullname>` and one `<title>`. Other elements
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed or an element count is wrong.
    pub fn from_xml(xml: &str) -> Result<Self, MetadataError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut data_count = 0;
        let mut fullname = Field::default();
        let mut title = Field::default();

        loop {
            let event = reader.read_event_into(&mut buf)?;
            let in_data = stack.contains(&Element::Data);
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let element = match e.local_name().as_ref() {
                        b"data" => Element::Data,
                        b"fullname" if in_data => Element::Fullname,
                        b"title" if in_data => Element::Title,
                        _ => Element::Other,
                    };
                    match element {
                        Element::Data => data_count += 1,
                        Element::Fullname => fullname.count += 1,
                        Element::Title => title.count += 1,
                        Element::Other => {}
                    }
                    if matches!(event, Event::Start(_)) {
                        stack.push(element);
                    }
                }
                Event::Text(ref e) => {
                    let text = reader.decoder().decode(e)?;
                    push_text(stack.last(), &text, &mut fullname, &mut title);
                }
                Event::CData(ref e) => {
                    let text = reader.decoder().decode(e)?;
                    push_text(stack.last(), &text, &mut fullname, &mut title);
                }
                Event::GeneralRef(ref e) => {
                    let entity = reader.decoder().decode(e)?;
                    push_text(stack.last(), &resolve_entity(&entity), &mut fullname, &mut title);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if data_count != 1 {
            return Err(MetadataError::ElementCount {
                element: "data",
                count: data_count,
            });
        }

        Ok(Self {
            fullname: fullname.into_value("fullname")?,
            title: title.into_value("title")?,
        })
    }
}

fn push_text(current: Option<&Element>, text: &str, fullname: &mut Field, title: &mut Field) {
    match current {
        Some(Element::Fullname) => fullname.text.push_str(text),
        Some(Element::Title) => title.text.push_str(text),
        _ => {}
    }
}

/// Resolve a predefined or numeric entity reference; unknown ones are kept.
fn resolve_entity(entity: &str) -> String {
    if let Some(resolved) = resolve_predefined_entity(entity) {
        return resolved.to_owned();
    }
    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        entity.strip_prefix('#').and_then(|dec| dec.parse().ok())
    };
    code.and_then(char::from_u32)
        .map_or_else(|| format!("&{entity};"), |c| c.to_string())
}
