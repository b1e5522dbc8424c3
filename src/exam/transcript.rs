//! The append-only record of an exam chat.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, from_reader, to_writer_pretty};
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::exam::QuestionSet;

/// Who a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A question revealed by the session.
    Question,
    /// An answer submitted by the candidate.
    Answer,
    /// A message from the session itself, such as the completion notice.
    System,
}

impl Role {
    /// The style tag used for bubbles of this role.
    pub fn class_name(&self) -> &'static str {
        match self {
            Role::Question => "question",
            Role::Answer => "answer",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

/// One rendered bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The bubble's role.
    pub role: Role,
    /// The bubble's text.
    pub text: String,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Every bubble rendered so far, in order.
///
/// Only the session appends to a transcript; entries are never reordered or
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, role: Role, text: impl Into<String>) -> &Entry {
        self.entries.push(Entry::new(role, text));
        &self.entries[self.entries.len() - 1]
    }

    /// Returns all entries in order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been rendered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the most recent entry.
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Counts the entries with the given role.
    pub fn count(&self, role: Role) -> usize {
        self.entries.iter().filter(|entry| entry.role == role).count()
    }

    /// Pairs every answer with the key of the question it answered.
    ///
    /// Answers are matched to questions by position, so the n-th answer is
    /// stored under `q{n}`. Answers beyond the question set are ignored.
    pub fn answers(&self, questions: &QuestionSet) -> Map<String, Value> {
        self.entries
            .iter()
            .filter(|entry| entry.role == Role::Answer)
            .take(questions.len())
            .enumerate()
            .map(|(index, entry)| {
                (
                    QuestionSet::key_for(index),
                    Value::String(entry.text.clone()),
                )
            })
            .collect()
    }

    /// Saves the transcript and its questions to `path` as JSON.
    pub fn save_to<P: AsRef<Path>>(&self, path: P, questions: &QuestionSet) -> Result<()> {
        let file = TranscriptFile {
            version: TRANSCRIPT_VERSION,
            saved_at: OffsetDateTime::now_utc(),
            questions: questions.as_slice().to_vec(),
            answers: self.answers(questions),
            entries: self.entries.clone(),
        };
        let out = File::create(path.as_ref())
            .map_err(|err| Error::io("failed to create transcript file", err))?;
        let mut writer = BufWriter::new(out);
        to_writer_pretty(&mut writer, &file).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })?;
        writer
            .flush()
            .map_err(|err| Error::io("failed to write transcript file", err))
    }

    /// Loads a transcript previously written by [`Transcript::save_to`].
    ///
    /// The loaded transcript is for inspection only; sessions always start
    /// from an empty transcript.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<(Transcript, QuestionSet)> {
        let input = File::open(path.as_ref())
            .map_err(|err| Error::io("failed to open transcript file", err))?;
        let reader = BufReader::new(input);
        let file: TranscriptFile = from_reader(reader).map_err(|err| {
            Error::serialization("failed to parse transcript", Some(Box::new(err)))
        })?;
        if file.version != TRANSCRIPT_VERSION {
            return Err(Error::validation(
                format!("unsupported transcript version {}", file.version),
                Some("version".to_string()),
            ));
        }
        Ok((
            Transcript {
                entries: file.entries,
            },
            QuestionSet::from(file.questions),
        ))
    }
}

const TRANSCRIPT_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct TranscriptFile {
    version: u8,
    #[serde(with = "time::serde::rfc3339")]
    saved_at: OffsetDateTime,
    questions: Vec<String>,
    #[serde(default)]
    answers: Map<String, Value>,
    entries: Vec<Entry>,
}
