use crate::domain::{ChatTable, EnrichedRecord, MessageRecord};

/// Adds the combined timestamp and the message length to each record.
///
/// Length counts Unicode scalar values, not bytes.
pub fn enrich_record(record: MessageRecord) -> EnrichedRecord {
    let full_datetime = record.full_datetime();
    let message_length = record.message.chars().count();
    EnrichedRecord {
        record,
        full_datetime,
        message_length,
    }
}

pub fn enrich(records: Vec<MessageRecord>) -> ChatTable {
    ChatTable::new(records.into_iter().map(enrich_record).collect())
}
