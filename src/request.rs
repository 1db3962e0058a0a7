//! Request building: validate an operation's inputs and shape the multipart body.
//!
//! [`build`] is pure. Identical `(op, files, range)` always produce an equal
//! [`OutboundPayload`], and nothing here touches the network, so the whole
//! validation table is testable without a server.
//!
//! ## Validation order
//!
//! The first failing rule wins:
//!
//! 1. Merge needs at least two files ([`ValidationError::InsufficientFiles`])
//! 2. Split and OCR need exactly one ([`ValidationError::WrongFileCount`])
//! 3. Split needs `1 <= start <= end` ([`ValidationError::InvalidRange`])

use crate::error::ValidationError;
use crate::operation::{rules, ExtraParams, Operation};
use crate::selection::FileSelection;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A 1-based inclusive page range for Split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRange {
    pub start: u32,
    pub end: u32,
}

impl Default for SplitRange {
    fn default() -> Self {
        Self { start: 1, end: 1 }
    }
}

impl SplitRange {
    /// Construct a range, checking `1 <= start <= end`.
    pub fn new(start: u32, end: u32) -> Result<Self, ValidationError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start < 1 || self.end < self.start {
            return Err(ValidationError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of pages covered.
    pub fn page_count(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }
}

/// The value carried by one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        filename: String,
        content_type: &'static str,
        content: Bytes,
    },
}

/// One named multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub name: &'static str,
    pub value: PartValue,
}

/// A validated request body ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPayload {
    pub operation: Operation,
    /// Path below the service base URL.
    pub endpoint: &'static str,
    /// Fields in the order they are sent.
    pub parts: Vec<PayloadPart>,
}

impl OutboundPayload {
    /// Parts sent under `name`, in order.
    pub fn parts_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PayloadPart> + 'a {
        self.parts.iter().filter(move |p| p.name == name)
    }

    /// Value of the first text field called `name`.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.value {
            PartValue::Text(s) if p.name == name => Some(s.as_str()),
            _ => None,
        })
    }

    /// Total bytes of file content in the payload.
    pub fn content_bytes(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match &p.value {
                PartValue::File { content, .. } => content.len(),
                PartValue::Text(_) => 0,
            })
            .sum()
    }

    /// One line per field, for dry runs and debug logs.
    pub fn describe(&self) -> Vec<String> {
        self.parts
            .iter()
            .map(|p| match &p.value {
                PartValue::Text(s) => format!("{} = {:?}", p.name, s),
                PartValue::File {
                    filename,
                    content_type,
                    content,
                } => format!(
                    "{} = {} ({}, {} bytes)",
                    p.name,
                    filename,
                    content_type,
                    content.len()
                ),
            })
            .collect()
    }
}

/// Validate inputs for `op` and construct the outbound payload.
///
/// `range` is only consulted for [`Operation::Split`].
pub fn build(
    op: Operation,
    files: &FileSelection,
    range: SplitRange,
) -> Result<OutboundPayload, ValidationError> {
    let rules = rules(op);
    let count = files.len();

    match rules.max_files {
        None if count < rules.min_files => {
            return Err(ValidationError::InsufficientFiles {
                required: rules.min_files,
                actual: count,
            });
        }
        Some(max) if count < rules.min_files || count > max => {
            return Err(ValidationError::WrongFileCount {
                expected: max,
                actual: count,
            });
        }
        _ => {}
    }

    if rules.extra_params == ExtraParams::PageRange {
        range.validate()?;
    }

    let mut parts: Vec<PayloadPart> = files
        .files()
        .iter()
        .map(|f| PayloadPart {
            name: rules.file_field,
            value: PartValue::File {
                filename: f.name().to_string(),
                content_type: f.content_type(),
                content: f.content().clone(),
            },
        })
        .collect();

    if rules.extra_params == ExtraParams::PageRange {
        parts.push(PayloadPart {
            name: "start",
            value: PartValue::Text(range.start.to_string()),
        });
        parts.push(PayloadPart {
            name: "end",
            value: PartValue::Text(range.end.to_string()),
        });
    }

    debug!(
        "Built {} payload: {} parts, {} bytes",
        op,
        parts.len(),
        files.total_bytes()
    );

    Ok(OutboundPayload {
        operation: op,
        endpoint: rules.endpoint,
        parts,
    })
}
