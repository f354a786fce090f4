//! Error and value types shared by the format reader crates.

use std::error::Error as StdError;
use std::fmt;

pub mod value;

pub use value::{AttributeValue, infer_scalar};

/// A position within a source file, such as an XML element or a dBase record.
///
/// All indices are 1-based where possible to align with human expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number in the source (1-based)
    pub line: Option<u64>,
    /// Column number in the source (1-based)
    pub column: Option<u64>,
    /// Feature or record number reported by the reader (1-based)
    pub record: Option<u64>,
}

impl SourcePosition {
    /// Position pointing at the n-th feature of a dataset.
    #[must_use]
    pub fn record(record: u64) -> Self {
        Self {
            record: Some(record),
            ..Self::default()
        }
    }

    /// Returns true when the position does not contain any location metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.column.is_none() && self.record.is_none()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(line) = self.line {
            parts.push(format!("line {line}"));
        }
        if let Some(column) = self.column {
            parts.push(format!("column {column}"));
        }
        if let Some(record) = self.record {
            parts.push(format!("feature {record}"));
        }

        if parts.is_empty() {
            write!(f, "unknown position")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Errors raised while opening or decoding a geospatial source file.
#[derive(Debug)]
pub enum FormatReadError {
    /// An underlying I/O failure occurred.
    Io {
        /// The originating error.
        source: std::io::Error,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
    /// The source is malformed.
    Parse {
        /// Human readable description of the failure.
        message: String,
        /// Optional position describing where the failure occurred.
        position: Option<SourcePosition>,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
    /// The source is well-formed but uses a construct the reader does not handle.
    Unsupported {
        /// Human readable description of the construct.
        message: String,
    },
    /// The source declares a coordinate reference system that cannot be resolved.
    UnknownCrs {
        /// The identifier as written in the source.
        identifier: String,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
}

impl FormatReadError {
    /// Shorthand for a [`FormatReadError::Parse`] without position or context.
    pub fn parse(message: impl Into<String>) -> Self {
        FormatReadError::Parse {
            message: message.into(),
            position: None,
            context: None,
        }
    }

    /// Wraps any library error as a parse failure, keeping its message.
    pub fn from_library(err: impl fmt::Display, context: impl Into<String>) -> Self {
        FormatReadError::Parse {
            message: err.to_string(),
            position: None,
            context: Some(context.into()),
        }
    }

    fn fmt_context(context: Option<&str>) -> String {
        context
            .map(|c| format!(" while reading {c}"))
            .unwrap_or_default()
    }

    fn fmt_position(position: Option<&SourcePosition>) -> String {
        position
            .filter(|pos| !pos.is_empty())
            .map(|pos| format!(" at {pos}"))
            .unwrap_or_default()
    }

    /// Attach a position to a parse error. Other variants are returned unchanged.
    #[must_use]
    pub fn at(mut self, new_position: SourcePosition) -> Self {
        if let FormatReadError::Parse { position, .. } = &mut self {
            *position = Some(new_position);
        }
        self
    }

    /// Attach additional context to the error, returning the updated error.
    #[must_use]
    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        match &mut self {
            FormatReadError::Io {
                context: existing, ..
            }
            | FormatReadError::Parse {
                context: existing, ..
            }
            | FormatReadError::UnknownCrs {
                context: existing, ..
            } => match existing {
                Some(existing) if !existing.is_empty() => {
                    existing.push_str("; ");
                    existing.push_str(&context);
                },
                _ => *existing = Some(context),
            },
            FormatReadError::Unsupported { message } => {
                message.push_str(" (");
                message.push_str(&context);
                message.push(')');
            },
        }
        self
    }
}

impl fmt::Display for FormatReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatReadError::Io { source, context } => {
                write!(
                    f,
                    "I/O error{}: {source}",
                    Self::fmt_context(context.as_deref())
                )
            },
            FormatReadError::Parse {
                message,
                position,
                context,
            } => write!(
                f,
                "Parse error{}{}: {message}",
                Self::fmt_context(context.as_deref()),
                Self::fmt_position(position.as_ref())
            ),
            FormatReadError::Unsupported { message } => write!(f, "Unsupported: {message}"),
            FormatReadError::UnknownCrs {
                identifier,
                context,
            } => write!(
                f,
                "Unknown CRS '{identifier}'{}",
                Self::fmt_context(context.as_deref())
            ),
        }
    }
}

impl StdError for FormatReadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            FormatReadError::Io { source, .. } => Some(source),
            FormatReadError::Parse { .. }
            | FormatReadError::Unsupported { .. }
            | FormatReadError::UnknownCrs { .. } => None,
        }
    }
}

impl From<std::io::Error> for FormatReadError {
    fn from(source: std::io::Error) -> Self {
        FormatReadError::Io {
            source,
            context: None,
        }
    }
}

/// Result type alias that uses [`FormatReadError`].
pub type FormatResult<T> = Result<T, FormatReadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_source_position() {
        let pos = SourcePosition {
            line: Some(10),
            column: Some(3),
            ..SourcePosition::default()
        };

        assert_eq!(pos.to_string(), "line 10, column 3");
        assert_eq!(SourcePosition::default().to_string(), "unknown position");
    }

    #[test]
    fn display_parse_error_with_context() {
        let error = FormatReadError::parse("unexpected element <gml:Foo>")
            .at(SourcePosition::record(4))
            .with_additional_context("border.gml");

        assert_eq!(
            error.to_string(),
            "Parse error while reading border.gml at feature 4: unexpected element <gml:Foo>"
        );
    }

    #[test]
    fn context_is_appended() {
        let error = FormatReadError::from_library("bad header", "a.shp")
            .with_additional_context("upload 12");
        assert_eq!(
            error.to_string(),
            "Parse error while reading a.shp; upload 12: bad header"
        );
    }

    #[test]
    fn io_error_exposes_source() {
        let error: FormatReadError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(error.source().is_some());
        assert_eq!(error.to_string(), "I/O error: gone");
    }
}
