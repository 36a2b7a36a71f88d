//! Path templates.
//!
//! A template is literal text with placeholders filled from the query string:
//!
//! - `{{ name }}` or `{{ .name }}`: first value of `name`
//! - `{{ index .name N }}` (dot optional): the `N`th value of `name`, from 0
//!
//! The `index` form is how Go templates over `url.Values` pick a value, so
//! `{{index .file 0}}` renders the same as `{{ .file }}` here. Unlike Go, a
//! bare `{{ .file }}` renders the first value rather than the whole list.
//!
//! Templates are compiled once at startup; only rendering happens per request.

use std::fmt;
use std::str::FromStr;

/// Errors produced while compiling or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A `{{` without a matching `}}`.
    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),

    /// A placeholder whose name is empty or contains unsupported characters.
    #[error("invalid placeholder {name:?} at byte {position}")]
    InvalidName { name: String, position: usize },

    /// A referenced parameter is absent from the request.
    #[error("no value for template parameter {0:?}")]
    MissingValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, index: usize },
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compiles a template.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or(TemplateError::Unterminated(offset + start))?;

            let raw = after_open[..end].trim();
            let (name, index) = parse_action(raw).ok_or_else(|| TemplateError::InvalidName {
                name: raw.to_string(),
                position: offset + start,
            })?;
            segments.push(Segment::Param {
                name: name.to_string(),
                index,
            });

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Renders the template against query parameters.
    ///
    /// When a name repeats, the first value wins unless the placeholder
    /// selects another one with `index`.
    pub fn render(&self, params: &[(String, String)]) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param { name, index } => {
                    let value = params
                        .iter()
                        .filter(|(key, _)| key == name)
                        .nth(*index)
                        .map(|(_, value)| value)
                        .ok_or_else(|| TemplateError::MissingValue(name.clone()))?;
                    out.push_str(value);
                },
            }
        }

        Ok(out)
    }

    /// Returns the template source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the parameter names referenced by the template, in order.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

/// Parses the inside of `{{ }}` into a parameter name and value index.
fn parse_action(raw: &str) -> Option<(&str, usize)> {
    let words: Vec<&str> = raw.split_whitespace().collect();

    let (field, index) = match words.as_slice() {
        [field] => (*field, 0),
        ["index", field, index] => (*field, index.parse().ok()?),
        _ => return None,
    };

    let name = field.strip_prefix('.').unwrap_or(field);
    is_valid_name(name).then_some((name, index))
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
