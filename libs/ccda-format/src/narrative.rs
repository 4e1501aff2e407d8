//! CDA narrative block → XHTML.
//!
//! Section narrative in C-CDA uses its own tag set. FHIR `Narrative.div`
//! needs XHTML, so the markup is streamed through a small tag translation:
//!
//! | CDA | XHTML |
//! |---|---|
//! | `paragraph` | `p` |
//! | `content` | `span` |
//! | `list` | `ul`, or `ol` when `listType="ordered"` |
//! | `item` | `li` |
//! | `linkHtml` | `a` |
//! | `caption` | `caption` inside a table, `p` elsewhere |
//! | table elements, `br`, `sub`, `sup` | unchanged |
//! | `footnote`, `footnoteRef`, `renderMultiMedia` | dropped with content |
//! | anything else | `span` |

use crate::error::MalformedDocumentError;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

const WRAPPER: &str = "narrative";

enum Mapped {
    Tag(&'static str),
    Drop,
}

/// Render CDA narrative markup as `<div xmlns="http://www.w3.org/1999/xhtml">…</div>`.
pub fn render_narrative(markup: &str) -> Result<String, MalformedDocumentError> {
    let wrapped = format!("<{WRAPPER}>{markup}</{WRAPPER}>");
    let mut reader = Reader::from_str(&wrapped);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut root = BytesStart::new("div");
    root.push_attribute(("xmlns", XHTML_NS));
    writer.write_event(Event::Start(root))?;

    // Output tag for every open input element; `None` for the wrapper
    let mut open: Vec<Option<&'static str>> = Vec::new();
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    continue;
                }
                if open.is_empty() {
                    open.push(None);
                    continue;
                }
                let parent = open.last().copied().flatten();
                match map_tag(&e, parent) {
                    Mapped::Drop => skip_depth = 1,
                    Mapped::Tag(tag) => {
                        writer.write_event(Event::Start(translate(&e, tag)))?;
                        open.push(Some(tag));
                    }
                }
            }
            Event::Empty(e) => {
                if skip_depth > 0 {
                    continue;
                }
                let parent = open.last().copied().flatten();
                if let Mapped::Tag(tag) = map_tag(&e, parent) {
                    writer.write_event(Event::Empty(translate(&e, tag)))?;
                }
            }
            Event::End(_) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                if let Some(Some(tag)) = open.pop() {
                    writer.write_event(Event::End(BytesEnd::new(tag)))?;
                }
            }
            Event::Text(text) if skip_depth == 0 => writer.write_event(Event::Text(text))?,
            Event::CData(data) if skip_depth == 0 => writer.write_event(Event::CData(data))?,
            Event::Eof => break,
            _ => {}
        }
    }

    writer.write_event(Event::End(BytesEnd::new("div")))?;
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn map_tag(start: &BytesStart, parent: Option<&str>) -> Mapped {
    let local = start.local_name();
    let tag = match local.as_ref() {
        b"paragraph" => "p",
        b"content" => "span",
        b"list" if is_ordered(start) => "ol",
        b"list" => "ul",
        b"item" => "li",
        b"linkHtml" => "a",
        b"caption" if parent == Some("table") => "caption",
        b"caption" => "p",
        b"table" => "table",
        b"thead" => "thead",
        b"tbody" => "tbody",
        b"tfoot" => "tfoot",
        b"tr" => "tr",
        b"th" => "th",
        b"td" => "td",
        b"col" => "col",
        b"colgroup" => "colgroup",
        b"br" => "br",
        b"sub" => "sub",
        b"sup" => "sup",
        b"footnote" | b"footnoteRef" | b"renderMultiMedia" => return Mapped::Drop,
        _ => "span",
    };
    Mapped::Tag(tag)
}

fn is_ordered(start: &BytesStart) -> bool {
    start.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"listType" && attr.value.as_ref() == b"ordered"
    })
}

/// Copy the attributes XHTML understands; values are passed through unescaped-as-read.
fn translate(source: &BytesStart, tag: &'static str) -> BytesStart<'static> {
    let mut out = BytesStart::new(tag);
    for attr in source.attributes().flatten() {
        let target = match attr.key.local_name().as_ref() {
            b"ID" => "id",
            b"styleCode" => "class",
            b"href" if tag == "a" => "href",
            b"colspan" if matches!(tag, "td" | "th") => "colspan",
            b"rowspan" if matches!(tag, "td" | "th") => "rowspan",
            _ => continue,
        };
        out.push_attribute((target.as_bytes(), attr.value.as_ref()));
    }
    out
}
