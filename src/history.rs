//! Rolling reading history and its flash-resident document form.
//!
//! [`ReadingLog`] is a fixed 240-slot circular buffer: appending overwrites
//! the oldest slot and the externally observed order is always oldest first.
//! The persisted form is a single JSON document,
//! `{"logfile":[<reading>,<reading>,...]}`, written entry by entry and read
//! back with a chunked one-object-at-a-time parse so a corrupt entry is
//! pinpointed rather than silently absorbed.

use std::io::Write;

use crate::app::ports::StorageError;
use crate::reading::{Reading, WireReading};

/// Number of log slots. Five days of history at one entry per half hour.
/// Changing this invalidates any previously persisted document.
pub const LOG_SIZE: usize = 240;

/// File name of the persisted document on the flash filesystem.
pub const LOGFILE_NAME: &str = "logfile.json";

const LOGFILE_HDR: &str = "{\"logfile\":[";
const LOGFILE_TLR: &str = "]}";

/// Why a persisted document could not be parsed back into a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogParseError {
    /// Document does not start with the expected header literal.
    MissingHeader,
    /// Entry at this index failed to parse as a reading object.
    BadEntry(usize),
    /// Document ended before the trailer was found.
    Truncated,
    /// Document holds more entries than the log has slots.
    Overflow,
}

/// Fixed-capacity, insertion-ordered reading history.
///
/// Invariant: the log always holds exactly [`LOG_SIZE`] readings; there is
/// no empty state. Construction pre-fills every slot.
pub struct ReadingLog {
    slots: Vec<Reading>,
    /// Index of the oldest entry.
    head: usize,
}

impl ReadingLog {
    /// A log with every slot holding a copy of `seed`.
    pub fn filled_with(seed: Reading) -> Self {
        Self {
            slots: vec![seed; LOG_SIZE],
            head: 0,
        }
    }

    /// Evict the oldest reading and store `r` as the newest.
    pub fn append(&mut self, r: Reading) {
        self.slots[self.head] = r;
        self.head = (self.head + 1) % LOG_SIZE;
    }

    /// All readings, oldest first. Always yields exactly [`LOG_SIZE`] items.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading> {
        self.slots[self.head..].iter().chain(self.slots[..self.head].iter())
    }

    /// The most recently appended reading.
    pub fn latest(&self) -> &Reading {
        &self.slots[(self.head + LOG_SIZE - 1) % LOG_SIZE]
    }

    /// Stream the full document to `w`: header, comma-joined entries in
    /// order, trailer. Aborts on the first write or serialisation failure;
    /// bytes already written stay written.
    pub fn persist<W: Write>(&self, w: &mut W, uptime_secs: u64) -> Result<(), StorageError> {
        w.write_all(LOGFILE_HDR.as_bytes())
            .map_err(|_| StorageError::IoError)?;
        for (i, r) in self.iter().enumerate() {
            let entry = serde_json::to_string(&r.to_wire(uptime_secs))
                .map_err(|_| StorageError::IoError)?;
            w.write_all(entry.as_bytes())
                .map_err(|_| StorageError::IoError)?;
            if i < LOG_SIZE - 1 {
                w.write_all(b",").map_err(|_| StorageError::IoError)?;
            }
        }
        w.write_all(LOGFILE_TLR.as_bytes())
            .map_err(|_| StorageError::IoError)?;
        w.flush().map_err(|_| StorageError::IoError)
    }

    /// The full document as a string — the `GET /log` response body.
    pub fn render_document(&self, uptime_secs: u64) -> Result<String, StorageError> {
        let mut buf = Vec::with_capacity(LOG_SIZE * 160);
        self.persist(&mut buf, uptime_secs)?;
        String::from_utf8(buf).map_err(|_| StorageError::IoError)
    }

    /// Re-fill the log from a persisted document.
    ///
    /// Skips past the header literal, then alternates between parsing one
    /// reading object and scanning for the `,`/`]` delimiter. Entries fill
    /// slots starting at the oldest; a short document leaves the remaining
    /// slots at their previous values.
    pub fn restore(&mut self, document: &str) -> Result<(), LogParseError> {
        let start = document
            .find(LOGFILE_HDR)
            .ok_or(LogParseError::MissingHeader)?
            + LOGFILE_HDR.len();

        let mut cursor = start;
        let mut restored: Vec<Reading> = Vec::new();
        loop {
            // Reading objects are flat, so the next '}' closes the entry.
            let end = document[cursor..]
                .find('}')
                .map(|i| cursor + i + 1)
                .ok_or(LogParseError::Truncated)?;
            let wire: WireReading = serde_json::from_str(document[cursor..end].trim())
                .map_err(|_| LogParseError::BadEntry(restored.len()))?;
            if restored.len() == LOG_SIZE {
                return Err(LogParseError::Overflow);
            }
            restored.push(wire.into());
            cursor = end;

            let mut chars = document[cursor..].char_indices().skip_while(|(_, c)| c.is_whitespace());
            match chars.next() {
                Some((i, ',')) => cursor += i + 1,
                Some((_, ']')) => break,
                _ => return Err(LogParseError::Truncated),
            }
        }

        for (i, r) in restored.into_iter().enumerate() {
            self.slots[i] = r;
        }
        self.head = 0;
        Ok(())
    }
}
