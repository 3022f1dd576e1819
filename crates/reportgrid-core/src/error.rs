//! Error and warning types for reportgrid.
//!
//! Provides [`ReportError`] for failures that stop an operation,
//! [`ExtractWarning`] for per-page and per-document issues that let a batch
//! continue, [`ExtractResult`] for pairing a value with collected warnings,
//! and [`ExtractOptions`] for interpreter limits.

use std::fmt;

/// Fatal error for a single operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    /// A PDF or workbook could not be opened or parsed.
    Document(String),
    /// An output workbook or sheet could not be created or written.
    Write(String),
    /// A required input (keyword, file list) was absent.
    EmptyInput(&'static str),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Document(msg) => write!(f, "document error: {msg}"),
            ReportError::Write(msg) => write!(f, "write error: {msg}"),
            ReportError::EmptyInput(what) => write!(f, "no {what} given"),
        }
    }
}

impl std::error::Error for ReportError {}

impl ReportError {
    /// Whether this error only signals missing input, which callers treat
    /// as a no-op rather than a failure.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, ReportError::EmptyInput(_))
    }
}

/// Machine-readable warning category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// A referenced font was not found in page resources.
    MissingFont,
    /// A PDF object is malformed or has unexpected structure.
    MalformedObject,
    /// Form XObject nesting exceeded the configured depth.
    ResourceLimitReached,
    /// A page could not be read or interpreted.
    UnreadablePage,
    /// A whole document could not be opened.
    UnreadableDocument,
}

impl ExtractWarningCode {
    pub fn as_str(&self) -> &str {
        match self {
            ExtractWarningCode::MissingFont => "MISSING_FONT",
            ExtractWarningCode::MalformedObject => "MALFORMED_OBJECT",
            ExtractWarningCode::ResourceLimitReached => "RESOURCE_LIMIT_REACHED",
            ExtractWarningCode::UnreadablePage => "UNREADABLE_PAGE",
            ExtractWarningCode::UnreadableDocument => "UNREADABLE_DOCUMENT",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue met while scanning or extracting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    pub code: ExtractWarningCode,
    pub description: String,
    /// Raw page index (0-based), if applicable.
    pub page: Option<usize>,
    /// Name of the document the warning belongs to.
    pub document: Option<String>,
    pub font_name: Option<String>,
}

impl ExtractWarning {
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            document: None,
            font_name: None,
        }
    }

    /// Create a warning for an unreadable page.
    pub fn on_page(description: impl Into<String>, page: usize) -> Self {
        Self {
            page: Some(page),
            ..Self::with_code(ExtractWarningCode::UnreadablePage, description)
        }
    }

    /// Create a warning for a document that could not be processed.
    pub fn for_document(document: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            ..Self::with_code(ExtractWarningCode::UnreadableDocument, description)
        }
    }

    pub fn set_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = Some(font_name.into());
        self
    }

    pub fn set_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(ref document) = self.document {
            write!(f, " ({document})")?;
        }
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(ref font_name) = self.font_name {
            write!(f, " [font {font_name}]")?;
        }
        Ok(())
    }
}

/// A value paired with the warnings collected while producing it.
#[derive(Debug, Clone)]
pub struct ExtractResult<T> {
    pub value: T,
    pub warnings: Vec<ExtractWarning>,
}

impl<T> ExtractResult<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Options controlling content stream interpretation.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum recursion depth for nested form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Whether to collect warnings during extraction (default: true).
    pub collect_warnings: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            collect_warnings: true,
        }
    }
}
