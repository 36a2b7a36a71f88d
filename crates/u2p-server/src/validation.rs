//! Request validation.
//!
//! Turns a raw [`Submission`] into a [`ConvertRequest`], or the full list of
//! field errors. No repository or network work happens before this succeeds.

use std::fmt;

use serde::Serialize;

use crate::extractors::Submission;

/// A required field is missing or empty.
pub const REQUIRED_ERROR: &str = "RequiredError";
/// The `file` field does not end in the expected suffix.
pub const SUFFIX_ERROR: &str = "SuffixError";
/// A field could not be converted to its type.
pub const TYPE_ERROR: &str = "TypeError";
/// A field has the right type but an unusable shape.
pub const FORMAT_ERROR: &str = "FormatError";

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_names: Vec<String>,
    pub classification: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, classification: &str, message: impl Into<String>) -> Self {
        Self {
            field_names: vec![field.to_string()],
            classification: classification.to_string(),
            message: message.into(),
        }
    }
}

/// All validation failures of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns true if any error has the given classification.
    pub fn has(&self, classification: &str) -> bool {
        self.0.iter().any(|e| e.classification == classification)
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {} ({})", e.field_names.join(","), e.classification, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub branch: String,
    pub file: String,
    pub fetch: bool,
    /// Query parameters, in order, for path templating.
    pub query: Vec<(String, String)>,
}

/// Validates conversion submissions.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    suffix: String,
}

impl RequestValidator {
    /// Creates a validator requiring `file` to end with `suffix`.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Returns the required file suffix.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Validates a submission, collecting every field error.
    pub fn validate(&self, submission: &Submission) -> Result<ConvertRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let branch = required(submission, "branch", &mut errors);
        if let Some(branch) = branch
            && let Err(reason) = u2p_git::validate_branch(branch)
        {
            errors.push(FieldError::new("branch", FORMAT_ERROR, reason));
        }

        let file = required(submission, "file", &mut errors);
        if let Some(file) = file
            && !file.ends_with(&self.suffix)
        {
            errors.push(FieldError::new(
                "file",
                SUFFIX_ERROR,
                format!("require suffix `{}`", self.suffix),
            ));
        }

        let fetch = match submission.field("fetch").map(parse_bool) {
            None => false,
            Some(Ok(value)) => value,
            Some(Err(())) => {
                errors.push(FieldError::new("fetch", TYPE_ERROR, "expected a boolean"));
                false
            },
        };

        match (branch, file) {
            (Some(branch), Some(file)) if errors.is_empty() => Ok(ConvertRequest {
                branch: branch.to_string(),
                file: file.to_string(),
                fetch,
                query: submission.query().to_vec(),
            }),
            _ => Err(errors),
        }
    }
}

fn required<'a>(
    submission: &'a Submission,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match submission.field(field) {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.push(FieldError::new(field, REQUIRED_ERROR, "Required"));
            None
        },
    }
}

/// Parses the boolean spellings of Go's `strconv.ParseBool`; empty is false.
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value {
        "" => Ok(false),
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(()),
    }
}
