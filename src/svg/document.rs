//! SVG payload rewriting.
//!
//! Embedded documents follow the OpenType SVG coordinate convention: the
//! origin sits on the glyph baseline, so on the way in the `viewBox` origin
//! is translated down by the view height, and the root element is given an
//! `id` of `glyph<N>`. On the way out the translation is undone. Everything
//! else in the document (declaration, comments, nested elements, attribute
//! order) passes through untouched.

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::SvgraftError;

type Result<T> = std::result::Result<T, SvgraftError>;

/// A parsed SVG viewBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.min_x, self.min_y, self.width, self.height)
    }
}

/// Parse a viewBox string like "0 0 100 100". Tolerates any whitespace
/// between the four tokens.
pub fn parse_view_box(s: &str) -> Option<ViewBox> {
    let parts: Vec<f64> = s
        .split_whitespace()
        .filter_map(|p| p.parse::<f64>().ok())
        .collect();
    if parts.len() == 4 {
        Some(ViewBox {
            min_x: parts[0],
            min_y: parts[1],
            width: parts[2],
            height: parts[3],
        })
    } else {
        None
    }
}

enum Rewrite {
    /// Translate the origin to the baseline and stamp `id="glyph<N>"`.
    Embed(u16),
    /// Undo the translation; leave `id` as written.
    Export,
}

/// Prepare an inbound payload for embedding under the given glyph id.
pub fn rewrite_for_embed(svg: &[u8], glyph_id: u16) -> Result<Vec<u8>> {
    rewrite(svg, Rewrite::Embed(glyph_id))
}

/// Prepare a stored document for export.
pub fn rewrite_for_export(svg: &[u8]) -> Result<Vec<u8>> {
    rewrite(svg, Rewrite::Export)
}

fn xml_err(e: impl fmt::Display) -> SvgraftError {
    SvgraftError::MalformedSvg(e.to_string())
}

fn rewrite(svg: &[u8], mode: Rewrite) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(svg);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let mut root_seen = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) if !root_seen => {
                root_seen = true;
                let rewritten = rewrite_root(&e, &mode)?;
                writer.write_event(Event::Start(rewritten)).map_err(xml_err)?;
            }
            Event::Empty(e) if !root_seen => {
                root_seen = true;
                let rewritten = rewrite_root(&e, &mode)?;
                writer.write_event(Event::Empty(rewritten)).map_err(xml_err)?;
            }
            Event::Eof => break,
            other => writer.write_event(other).map_err(xml_err)?,
        }
        buf.clear();
    }

    if !root_seen {
        return Err(SvgraftError::MalformedSvg(
            "document has no root element".into(),
        ));
    }
    Ok(writer.into_inner())
}

fn rewrite_root(e: &BytesStart, mode: &Rewrite) -> Result<BytesStart<'static>> {
    if e.name().local_name().as_ref() != b"svg" {
        return Err(SvgraftError::MalformedSvg(format!(
            "root element is <{}>, expected <svg>",
            String::from_utf8_lossy(e.name().as_ref())
        )));
    }

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut saw_id = false;
    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let mut value = attr.unescape_value().map_err(xml_err)?.into_owned();
        match (key.as_str(), mode) {
            ("viewBox", Rewrite::Embed(_)) => {
                if let Some(mut vb) = parse_view_box(&value) {
                    vb.min_y = vb.height;
                    value = vb.to_string();
                }
            }
            ("viewBox", Rewrite::Export) => {
                if let Some(mut vb) = parse_view_box(&value) {
                    vb.min_y = 0.0;
                    value = vb.to_string();
                }
            }
            ("id", Rewrite::Embed(glyph_id)) => {
                saw_id = true;
                value = format!("glyph{}", glyph_id);
            }
            _ => {}
        }
        attrs.push((key, value));
    }
    if let Rewrite::Embed(glyph_id) = mode {
        if !saw_id {
            attrs.push(("id".to_string(), format!("glyph{}", glyph_id)));
        }
    }

    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut elem = BytesStart::new(name);
    for (key, value) in &attrs {
        elem.push_attribute((key.as_str(), value.as_str()));
    }
    Ok(elem)
}
