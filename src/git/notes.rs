//! Parser for `git notes list` output.
//!
//! Each line of a listing is `<note-object-id> <attached-object-id>`. Listings
//! produced on different platforms may use `\n`, `\r\n` or a bare `\r`
//! between records; all three are normalized before parsing.
//!
//! The parse result keeps the "how many records" question explicit, since the
//! lock protocol is built on the invariant that its notes ref holds at most
//! one record.

use anyhow::Result;

use crate::core::DependError;

/// One line of a notes listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Object id of the note blob itself
    pub note_id: String,
    /// Object id of the commit the note is attached to
    pub object_id: String,
}

/// A parsed notes listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesListing {
    /// The ref holds no notes (or does not exist yet)
    Empty,
    /// Exactly one note
    Single(NoteRecord),
    /// Two or more notes
    Multiple(Vec<NoteRecord>),
}

impl NotesListing {
    /// Parses raw `git notes list` output.
    ///
    /// # Errors
    ///
    /// Returns [`DependError::MalformedNotes`] for any non-blank line that is
    /// not two hexadecimal object ids separated by whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

        let mut records = normalized
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(parse_record)
            .collect::<Result<Vec<_>>>()?;

        Ok(match records.len() {
            0 => Self::Empty,
            1 => Self::Single(records.remove(0)),
            _ => Self::Multiple(records),
        })
    }

    /// Number of records in the listing.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Multiple(records) => records.len(),
        }
    }

    /// Every record, in listing order.
    #[must_use]
    pub fn into_records(self) -> Vec<NoteRecord> {
        match self {
            Self::Empty => Vec::new(),
            Self::Single(record) => vec![record],
            Self::Multiple(records) => records,
        }
    }

    /// Returns true when the listing holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

fn parse_record(line: &str) -> Result<NoteRecord> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(note_id), Some(object_id), None) if is_object_id(note_id) && is_object_id(object_id) => {
            Ok(NoteRecord {
                note_id: note_id.to_string(),
                object_id: object_id.to_string(),
            })
        }
        _ => Err(DependError::MalformedNotes {
            line: line.to_string(),
        }
        .into()),
    }
}

fn is_object_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}
