use chrono::Timelike;
use std::collections::HashMap;

use crate::domain::{ChatTable, MEDIA_PLACEHOLDER};

const NOT_CONVERTED: &str =
    "Please convert a chat file first.\nकृपया पहले चैट फ़ाइल कनवर्ट करें।";

const NOT_UNDERSTOOD: &str = "I didn't understand that. Try asking about 'total messages', 'top sender', or 'busy time'.\nमुझे समझ नहीं आया। 'कुल संदेश', 'किसने भेजा', या 'व्यस्त समय' के बारे में पूछें।";

const NO_MESSAGES: &str = "The chat has no messages.\nचैट में कोई संदेश नहीं है।";

struct Intent {
    keywords: &'static [&'static str],
    answer: fn(&ChatTable) -> String,
}

/// Checked in order; the first intent with a matching keyword answers.
const INTENTS: &[Intent] = &[
    Intent {
        keywords: &["count", "total", "messages", "kitne", "sankhya"],
        answer: answer_count,
    },
    Intent {
        keywords: &["sender", "who", "kisne", "bheja", "top"],
        answer: answer_top_sender,
    },
    Intent {
        keywords: &["media", "photo", "video", "image", "tasveer"],
        answer: answer_media,
    },
    Intent {
        keywords: &["time", "busy", "kab", "samay", "hour"],
        answer: answer_busiest_hour,
    },
    Intent {
        keywords: &["start", "end", "first", "last", "shuru", "khatam"],
        answer: answer_boundaries,
    },
];

fn answer_count(table: &ChatTable) -> String {
    let total = table.len();
    format!("Total messages: {total}\nकुल संदेश: {total}")
}

fn answer_top_sender(table: &ChatTable) -> String {
    match top_sender(table) {
        Some((sender, count)) => format!(
            "Top sender is {sender} with {count} messages.\nसबसे ज्यादा संदेश {sender} ने भेजे हैं ({count})."
        ),
        None => NO_MESSAGES.to_string(),
    }
}

fn answer_media(table: &ChatTable) -> String {
    let media = media_count(table);
    format!("Total media files (omitted): {media}\nकुल मीडिया फाइलें: {media}")
}

fn answer_busiest_hour(table: &ChatTable) -> String {
    match busiest_hour(table) {
        Some(hour) => format!(
            "Busiest time is around {hour}:00.\nसबसे व्यस्त समय {hour}:00 बजे के आसपास है।"
        ),
        None => NO_MESSAGES.to_string(),
    }
}

fn answer_boundaries(table: &ChatTable) -> String {
    let stamps = table.iter().map(|row| row.full_datetime);
    match (stamps.clone().min(), stamps.max()) {
        (Some(start), Some(end)) => {
            let start = start.format("%Y-%m-%d %H:%M:%S");
            let end = end.format("%Y-%m-%d %H:%M:%S");
            format!("Chat started: {start}\nChat ended: {end}\nचैट शुरू: {start}\nचैट समाप्त: {end}")
        }
        _ => NO_MESSAGES.to_string(),
    }
}

/// Most frequent sender and its message count. Ties go to whoever
/// appears first in the chat.
pub fn top_sender(table: &ChatTable) -> Option<(&str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for row in table {
        let sender = row.record.sender.as_str();
        let count = counts.entry(sender).or_insert(0);
        if *count == 0 {
            order.push(sender);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for sender in order {
        let count = counts[sender];
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((sender, count));
        }
    }
    best
}

/// Messages containing the media placeholder, ignoring case.
pub fn media_count(table: &ChatTable) -> usize {
    let needle = MEDIA_PLACEHOLDER.to_lowercase();
    table
        .iter()
        .filter(|row| row.record.message.to_lowercase().contains(&needle))
        .count()
}

/// Hour of day with the most messages; ties resolve to the earliest hour.
pub fn busiest_hour(table: &ChatTable) -> Option<u32> {
    let mut per_hour = [0usize; 24];
    for row in table {
        per_hour[row.full_datetime.hour() as usize] += 1;
    }
    let max = per_hour.iter().copied().max().filter(|&n| n > 0)?;
    per_hour
        .iter()
        .position(|&n| n == max)
        .map(|hour| hour as u32)
}

/// Answers `query` against `table`, or asks for a conversion when there
/// is no table yet. Answers are English followed by Hindi.
pub fn respond(table: Option<&ChatTable>, query: &str) -> String {
    let Some(table) = table else {
        return NOT_CONVERTED.to_string();
    };

    let query = query.to_lowercase();
    INTENTS
        .iter()
        .find(|intent| intent.keywords.iter().any(|k| query.contains(k)))
        .map(|intent| (intent.answer)(table))
        .unwrap_or_else(|| NOT_UNDERSTOOD.to_string())
}

/// Holds the converted table for repeated questions.
#[derive(Debug, Clone, Copy)]
pub struct ChatAnalyzer<'a> {
    table: Option<&'a ChatTable>,
}

impl<'a> ChatAnalyzer<'a> {
    pub fn new(table: Option<&'a ChatTable>) -> Self {
        Self { table }
    }

    pub fn respond(&self, query: &str) -> String {
        respond(self.table, query)
    }
}
