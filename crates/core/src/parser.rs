use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::domain::{MessageRecord, SYSTEM_SENDER};
use crate::timestamp::parse_timestamp;

/// `[12/01/24, 10:30:45 AM] Alice: hi` or `12/01/24, 10:30 - Alice: hi`.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[?(\d{1,2}[/-]\d{1,2}[/-]\d{2,4},? \d{1,2}:\d{2}(?::\d{2})?(?: [AP]M)?)\]?(?: -)? (.*)",
    )
    .expect("header pattern is valid")
});

const LEFT_TO_RIGHT_MARK: char = '\u{200E}';

fn is_leading_mark(c: char) -> bool {
    matches!(
        c,
        '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
    )
}

fn strip_directional_marks(line: &str) -> String {
    line.replace(LEFT_TO_RIGHT_MARK, "")
        .trim_start_matches(is_leading_mark)
        .to_string()
}

/// Header of the message currently being assembled.
#[derive(Debug, Clone)]
struct OpenHeader {
    date: NaiveDate,
    time: NaiveTime,
    sender: String,
}

/// Accumulation state threaded through a single parse pass.
#[derive(Debug, Default)]
struct RecordAccumulator {
    open: Option<OpenHeader>,
    buffer: Vec<String>,
    records: Vec<MessageRecord>,
}

impl RecordAccumulator {
    /// Finalizes the open message, if it has any body, and clears the buffer.
    fn flush(&mut self) {
        let fragments = std::mem::take(&mut self.buffer);
        if let Some(header) = &self.open {
            if !fragments.is_empty() {
                self.records.push(MessageRecord {
                    date: header.date,
                    time: header.time,
                    sender: header.sender.clone(),
                    message: fragments.join("\n"),
                });
            }
        }
    }

    fn start(&mut self, header: OpenHeader, first_fragment: &str) {
        self.flush();
        self.open = Some(header);
        self.buffer.push(first_fragment.to_string());
    }

    fn continue_with(&mut self, line: &str) {
        if self.open.is_some() {
            self.buffer.push(line.to_string());
        } else {
            trace!(line, "discarding line before first header");
        }
    }

    fn feed(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let line = strip_directional_marks(trimmed);

        let Some(caps) = HEADER_RE.captures(&line) else {
            self.continue_with(&line);
            return;
        };

        let Some(stamp) = parse_timestamp(&caps[1]) else {
            trace!(line = %line, "unparseable timestamp, treating as continuation");
            self.continue_with(&line);
            return;
        };

        let remainder = caps.get(2).map_or("", |m| m.as_str());
        let (sender, fragment) = match remainder.split_once(": ") {
            Some((sender, message)) => (sender, message),
            None => (SYSTEM_SENDER, remainder),
        };

        self.start(
            OpenHeader {
                date: stamp.date(),
                time: stamp.time(),
                sender: sender.to_string(),
            },
            fragment,
        );
    }

    fn finish(mut self) -> Vec<MessageRecord> {
        self.flush();
        self.records
    }
}

/// Parses transcript lines into message records.
///
/// Never fails: lines that cannot be understood are folded into the
/// previous message or, before the first header, dropped.
pub fn parse_lines<I, S>(lines: I) -> Vec<MessageRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut acc = RecordAccumulator::default();
    for line in lines {
        acc.feed(line.as_ref());
    }
    let records = acc.finish();
    debug!(records = records.len(), "parsed transcript");
    records
}
