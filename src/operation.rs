//! The operations the processing service supports and their input rules.
//!
//! The set is closed and every rule is a `const` lookup, so [`rules`] never
//! fails. The request builder reads `min_files`/`max_files` for validation and
//! `endpoint`/`file_field` for payload shape; a front end can read the same
//! table to decide which inputs to show.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A document-processing operation offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Concatenate two or more PDFs into one. (default)
    #[default]
    Merge,
    /// Extract a contiguous page range from one PDF.
    Split,
    /// Turn a scanned PDF into a searchable one.
    Ocr,
}

/// Extra inputs an operation needs besides its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtraParams {
    None,
    /// A 1-based inclusive `start`/`end` page range.
    PageRange,
}

/// Static input and endpoint rules for one [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationRules {
    pub min_files: usize,
    /// `None` means unbounded.
    pub max_files: Option<usize>,
    /// Path below the service base URL, e.g. `/api/pdf/merge`.
    pub endpoint: &'static str,
    /// Multipart field name each file is sent under.
    pub file_field: &'static str,
    pub extra_params: ExtraParams,
    /// Suggested download name for the result.
    pub output_filename: &'static str,
}

const MERGE: OperationRules = OperationRules {
    min_files: 2,
    max_files: None,
    endpoint: "/api/pdf/merge",
    file_field: "files",
    extra_params: ExtraParams::None,
    output_filename: "merged.pdf",
};

const SPLIT: OperationRules = OperationRules {
    min_files: 1,
    max_files: Some(1),
    endpoint: "/api/pdf/split",
    file_field: "file",
    extra_params: ExtraParams::PageRange,
    output_filename: "split.pdf",
};

const OCR: OperationRules = OperationRules {
    min_files: 1,
    max_files: Some(1),
    endpoint: "/api/pdf/ocr",
    file_field: "file",
    extra_params: ExtraParams::None,
    output_filename: "ocr_output.pdf",
};

/// Look up the rules for `op`.
pub fn rules(op: Operation) -> &'static OperationRules {
    match op {
        Operation::Merge => &MERGE,
        Operation::Split => &SPLIT,
        Operation::Ocr => &OCR,
    }
}

impl Operation {
    /// Every supported operation, in menu order.
    pub const ALL: [Operation; 3] = [Operation::Merge, Operation::Split, Operation::Ocr];

    pub fn rules(self) -> &'static OperationRules {
        rules(self)
    }

    pub fn endpoint(self) -> &'static str {
        rules(self).endpoint
    }

    /// Suggested filename for the processed document.
    pub fn output_filename(self) -> &'static str {
        rules(self).output_filename
    }

    /// Whether the operation accepts more than one input file.
    pub fn accepts_multiple(self) -> bool {
        rules(self).max_files.map_or(true, |max| max > 1)
    }

    /// Human-readable label, as shown in an operation picker.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Merge => "Merge PDFs",
            Operation::Split => "Split PDF",
            Operation::Ocr => "OCR (Scanned PDF to Searchable)",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Merge => "merge",
            Operation::Split => "split",
            Operation::Ocr => "ocr",
        })
    }
}
