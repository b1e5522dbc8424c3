//! The ordered question sequence an exam session walks.
//!
//! Question sets can come from plain text (one question per line), a JSON or
//! YAML list, or a keyed mapping such as `{"q1": "...", "q2": "..."}`, which is
//! the shape the question generator emits. Keyed mappings keep document order.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// An ordered, immutable list of exam questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<String>,
}

impl QuestionSet {
    /// Creates a question set from any strings, keeping their order.
    pub fn new<I, S>(questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            questions: questions.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a JSON array of strings or a JSON object of keyed questions.
    ///
    /// Markdown code fences around the document are ignored.
    pub fn parse_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(strip_code_fences(text))?;
        Self::from_value(value)
    }

    /// Parses a YAML sequence of strings or a YAML mapping of keyed questions.
    pub fn parse_yaml(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(strip_code_fences(text))?;
        Self::from_value(value)
    }

    /// Parses one question per non-blank line.
    pub fn parse_lines(text: &str) -> Result<Self> {
        Ok(Self::new(text.lines().map(str::trim).filter(|line| !line.is_empty())))
    }

    /// Loads a question set, choosing the format from the file extension.
    ///
    /// `.json` is JSON, `.yaml` and `.yml` are YAML, and anything else is read
    /// one question per line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::io(format!("failed to read questions from {}", path.display()), err)
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Self::parse_json(&text),
            Some("yaml") | Some("yml") => Self::parse_yaml(&text),
            _ => Self::parse_lines(&text),
        }
    }

    /// Keeps only the first `max` questions.
    pub fn limit(mut self, max: usize) -> Self {
        self.questions.truncate(max);
        self
    }

    /// Appends every question of `other` after this set's questions.
    pub fn concat(mut self, other: QuestionSet) -> Self {
        self.questions.extend(other.questions);
        self
    }

    /// Returns the question at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    /// Returns the number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns true if there are no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Iterates over the questions in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }

    /// Returns the questions as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.questions
    }

    /// The answer key for the question at `index` (`q1`, `q2`, ...).
    pub fn key_for(index: usize) -> String {
        format!("q{}", index + 1)
    }

    fn from_value(value: Value) -> Result<Self> {
        let questions = match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| question_text(&QuestionSet::key_for(index), item))
                .collect::<Result<Vec<_>>>()?,
            Value::Object(map) => {
                if let Some(error) = map.get("error") {
                    let message = error.as_str().unwrap_or("question generation failed");
                    return Err(Error::validation(message, Some("error".to_string())));
                }
                map.into_iter()
                    .map(|(key, item)| question_text(&key, item))
                    .collect::<Result<Vec<_>>>()?
            }
            _ => {
                return Err(Error::validation("questions must be a list or a mapping", None));
            }
        };
        Ok(Self { questions })
    }
}

impl From<Vec<String>> for QuestionSet {
    fn from(questions: Vec<String>) -> Self {
        Self { questions }
    }
}

impl From<&[&str]> for QuestionSet {
    fn from(questions: &[&str]) -> Self {
        Self::new(questions.iter().copied())
    }
}

fn question_text(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                Err(Error::validation("question is blank", Some(key.to_string())))
            } else {
                Ok(text.to_string())
            }
        }
        _ => Err(Error::validation("question must be a string", Some(key.to_string()))),
    }
}

/// Strips a Markdown code fence (```` ``` ```` or ```` ```json ````) wrapping `text`.
fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
