use std::sync::mpsc;
use std::thread;
use tracing::{debug, error, info, warn};

use crate::domain::ChatTable;
use crate::enrich::enrich;
use crate::error::ChatError;
use crate::parser::parse_lines;
use crate::ports::{Result, TableWriter, TranscriptSource};

/// Outcome of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub table: ChatTable,
}

impl ConversionReport {
    pub fn records(&self) -> usize {
        self.table.len()
    }

    /// A transcript that parsed cleanly but yielded no messages.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Loads, parses and enriches a transcript without exporting it.
pub fn load_table(source: &dyn TranscriptSource) -> Result<ChatTable> {
    let lines = source.read_lines()?;
    debug!(lines = lines.len(), "loaded transcript");
    let table = enrich(parse_lines(&lines));
    if table.is_empty() {
        warn!(lines = lines.len(), "transcript produced no messages");
    }
    Ok(table)
}

/// Application service for converting a chat transcript into a spreadsheet
pub struct ConversionService {
    source: Box<dyn TranscriptSource>,
    table_writer: Box<dyn TableWriter>,
}

impl ConversionService {
    /// Creates a new ConversionService with the given dependencies
    pub fn new(source: Box<dyn TranscriptSource>, table_writer: Box<dyn TableWriter>) -> Self {
        Self {
            source,
            table_writer,
        }
    }

    /// Executes the conversion: loads and parses the transcript, then writes the table.
    /// Any failure aborts the whole pipeline.
    pub fn convert(&self) -> Result<ConversionReport> {
        let table = load_table(self.source.as_ref())?;
        self.table_writer.write(&table)?;
        info!(records = table.len(), "conversion complete");
        Ok(ConversionReport { table })
    }
}

/// Pending result of a conversion running on a worker thread.
pub struct ConversionHandle {
    result_rx: mpsc::Receiver<Result<ConversionReport>>,
}

impl ConversionHandle {
    /// Blocks until the worker hands back its single result.
    pub fn wait(self) -> Result<ConversionReport> {
        self.result_rx.recv().unwrap_or_else(|_| {
            error!("conversion worker exited without a result");
            Err(ChatError::WorkerStopped)
        })
    }
}

/// Runs the conversion on a worker thread so the caller can keep a
/// progress indicator alive.
pub fn spawn_conversion(
    source: Box<dyn TranscriptSource>,
    table_writer: Box<dyn TableWriter>,
) -> ConversionHandle {
    let (result_tx, result_rx) = mpsc::channel();
    thread::spawn(move || {
        let service = ConversionService::new(source, table_writer);
        // Ignore send errors (the handle may have been dropped)
        let _ = result_tx.send(service.convert());
    });
    ConversionHandle { result_rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct StaticSource(Vec<&'static str>);

    impl TranscriptSource for StaticSource {
        fn read_lines(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|l| l.to_string()).collect())
        }
    }

    struct FailingSource;

    impl TranscriptSource for FailingSource {
        fn read_lines(&self) -> Result<Vec<String>> {
            Err(ChatError::source_read("missing.txt", "not found"))
        }
    }

    #[derive(Default, Clone)]
    struct RecordingWriter {
        written: Arc<Mutex<Vec<usize>>>,
    }

    impl TableWriter for RecordingWriter {
        fn write(&self, table: &ChatTable) -> Result<()> {
            self.written.lock().unwrap().push(table.len());
            Ok(())
        }
    }

    struct FailingWriter;

    impl TableWriter for FailingWriter {
        fn write(&self, _table: &ChatTable) -> Result<()> {
            Err(ChatError::Export("read-only destination".to_string()))
        }
    }

    struct PanickingWriter;

    impl TableWriter for PanickingWriter {
        fn write(&self, _table: &ChatTable) -> Result<()> {
            panic!("writer crashed");
        }
    }

    #[test]
    fn test_convert_writes_enriched_table() {
        let writer = RecordingWriter::default();
        let service = ConversionService::new(
            Box::new(StaticSource(vec![
                "12/01/24, 10:00 AM - Alice: Hi",
                "12/01/24, 10:01 AM - Bob: Hello",
            ])),
            Box::new(writer.clone()),
        );

        let report = service.convert().unwrap();
        assert_eq!(report.records(), 2);
        assert!(!report.is_empty());
        assert_eq!(*writer.written.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_convert_reports_empty_result() {
        let writer = RecordingWriter::default();
        let service = ConversionService::new(
            Box::new(StaticSource(vec!["no headers here"])),
            Box::new(writer.clone()),
        );

        let report = service.convert().unwrap();
        assert!(report.is_empty());
        assert_eq!(*writer.written.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_convert_stops_on_source_error() {
        let writer = RecordingWriter::default();
        let service = ConversionService::new(Box::new(FailingSource), Box::new(writer.clone()));

        let err = service.convert().unwrap_err();
        assert!(err.is_source_read());
        assert!(writer.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_convert_propagates_export_error() {
        let service = ConversionService::new(
            Box::new(StaticSource(vec!["12/01/24, 10:00 AM - Alice: Hi"])),
            Box::new(FailingWriter),
        );

        assert!(matches!(service.convert(), Err(ChatError::Export(_))));
    }

    #[test]
    fn test_load_table_enriches_rows() {
        let table = load_table(&StaticSource(vec!["12/01/24, 10:00 AM - Alice: Hi"])).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].message_length, 2);
    }

    #[test]
    fn test_spawn_conversion_returns_single_report() {
        let writer = RecordingWriter::default();
        let handle = spawn_conversion(
            Box::new(StaticSource(vec![
                "12/01/24, 10:00 AM - Alice: Hi",
                "12/01/24, 10:01 AM - Bob: Hello",
            ])),
            Box::new(writer.clone()),
        );

        let report = handle.wait().unwrap();
        assert_eq!(report.records(), 2);
        assert_eq!(*writer.written.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_spawn_conversion_hands_back_source_error() {
        let writer = RecordingWriter::default();
        let handle = spawn_conversion(Box::new(FailingSource), Box::new(writer.clone()));

        let err = handle.wait().unwrap_err();
        assert!(err.is_source_read());
        assert!(writer.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_spawn_conversion_worker_panic_is_worker_stopped() {
        let handle = spawn_conversion(
            Box::new(StaticSource(vec!["12/01/24, 10:00 AM - Alice: Hi"])),
            Box::new(PanickingWriter),
        );

        assert!(matches!(handle.wait(), Err(ChatError::WorkerStopped)));
    }
}
