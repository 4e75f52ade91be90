//! Structured error types for the svgraft engine.
//!
//! One variant per failure class in the engine's external contract: container
//! parsing, character-map support, name lookup, SVG payload handling, and the
//! I/O done on behalf of export and the plan runner.

use std::fmt;

/// The unified error type returned by all public svgraft API functions.
#[derive(Debug)]
pub enum SvgraftError {
    /// A read ran past the buffer, a declared table length is inconsistent,
    /// or a required table is absent.
    MalformedFont(String),
    /// The cmap table has no sub-table of format 0, 4, 6, or 12.
    UnsupportedCmap,
    /// No name record with nameID 1 and positive length.
    MissingName,
    /// An inbound payload failed XML parsing or lacks an `<svg>` root.
    MalformedSvg(String),
    /// An SVG payload begins with the gzip magic `0x1F 0x8B`.
    UnsupportedFormat,
    /// An embed referenced a glyph id absent from the cmap.
    UnknownGlyph(u16),
    /// A file read or write failed (export, plan execution).
    Io(std::io::Error),
    /// An edit plan failed to parse as JSON.
    PlanError(serde_json::Error),
}

impl fmt::Display for SvgraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgraftError::MalformedFont(msg) => write!(f, "Malformed font: {}", msg),
            SvgraftError::UnsupportedCmap => {
                write!(f, "No cmap sub-table of format 0, 4, 6, or 12")
            }
            SvgraftError::MissingName => {
                write!(f, "Font has no family name (nameID 1) record")
            }
            SvgraftError::MalformedSvg(msg) => write!(f, "Malformed SVG: {}", msg),
            SvgraftError::UnsupportedFormat => {
                write!(f, "Compressed (SVGZ) payloads are not supported")
            }
            SvgraftError::UnknownGlyph(id) => {
                write!(f, "Glyph id {} is not present in the font's cmap", id)
            }
            SvgraftError::Io(e) => write!(f, "I/O error: {}", e),
            SvgraftError::PlanError(e) => write!(f, "Failed to parse edit plan: {}", e),
        }
    }
}

impl std::error::Error for SvgraftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SvgraftError::Io(e) => Some(e),
            SvgraftError::PlanError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SvgraftError {
    fn from(e: std::io::Error) -> Self {
        SvgraftError::Io(e)
    }
}

impl From<serde_json::Error> for SvgraftError {
    fn from(e: serde_json::Error) -> Self {
        SvgraftError::PlanError(e)
    }
}
