use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Sender assigned to header lines without a `sender: message` delimiter.
pub const SYSTEM_SENDER: &str = "System";

/// Placeholder exporters write in place of attachments.
pub const MEDIA_PLACEHOLDER: &str = "<Media omitted>";

/// One message reconstructed from a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub date: NaiveDate,
    pub time: NaiveTime, // seconds are zero when the source had none
    pub sender: String,
    pub message: String,
}

impl MessageRecord {
    pub fn full_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// A record plus the fields derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub record: MessageRecord,
    pub full_datetime: NaiveDateTime,
    pub message_length: usize,
}

/// The enriched table handed to exporters and the query responder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTable {
    rows: Vec<EnrichedRecord>,
}

impl ChatTable {
    pub fn new(rows: Vec<EnrichedRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EnrichedRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedRecord> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a ChatTable {
    type Item = &'a EnrichedRecord;
    type IntoIter = std::slice::Iter<'a, EnrichedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
