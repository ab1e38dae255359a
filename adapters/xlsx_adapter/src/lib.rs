use chatsheet_core::domain::{ChatTable, EnrichedRecord};
use chatsheet_core::error::ChatError;
use chatsheet_core::ports::{Result, TableWriter};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet, XlsxError};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Column headers, in output order.
pub const COLUMNS: [&str; 6] = [
    "Date",
    "Time",
    "Sender",
    "Message",
    "Full DateTime",
    "Message Length",
];

/// Most characters a single xlsx cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub sheet_name: String,
    /// Upper bound for auto-sized column widths, in characters.
    pub max_column_width: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "WhatsApp Chat".to_string(),
            max_column_width: 50,
        }
    }
}

/// Spreadsheet writer adapter implementation
pub struct XlsxTableWriter {
    output_path: PathBuf,
    options: ExportOptions,
}

impl XlsxTableWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Sibling path the workbook is saved to before being moved into place.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .output_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.output_path.with_file_name(name)
    }

    fn build_workbook(&self, table: &ChatTable) -> std::result::Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.options.sheet_name)?;

        let bold = Format::new().set_bold();
        for (col, header) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        let formats = CellFormats::new();
        for (index, row) in table.iter().enumerate() {
            write_row(worksheet, index as u32 + 1, row, &formats)?;
        }

        worksheet.set_freeze_panes(1, 0)?;
        for (col, width) in column_widths(table, self.options.max_column_width)
            .into_iter()
            .enumerate()
        {
            worksheet.set_column_width(col as u16, width as f64)?;
        }

        Ok(workbook)
    }
}

struct CellFormats {
    date: Format,
    time: Format,
    datetime: Format,
    message: Format,
}

impl CellFormats {
    fn new() -> Self {
        Self {
            date: Format::new().set_num_format("yyyy-mm-dd"),
            time: Format::new().set_num_format("hh:mm:ss"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
            message: Format::new().set_text_wrap(),
        }
    }
}

// Parsed years have at most four digits; pre-1900 dates are rejected by
// ExcelDateTime itself.
fn excel_date(date: NaiveDate) -> std::result::Result<ExcelDateTime, XlsxError> {
    ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)
}

fn excel_time(time: NaiveTime) -> std::result::Result<ExcelDateTime, XlsxError> {
    ExcelDateTime::from_hms(time.hour() as u16, time.minute() as u8, time.second() as u8)
}

fn excel_datetime(stamp: NaiveDateTime) -> std::result::Result<ExcelDateTime, XlsxError> {
    let time = stamp.time();
    excel_date(stamp.date())?.and_hms(
        time.hour() as u16,
        time.minute() as u8,
        time.second() as u8,
    )
}

/// Cuts `text` to the cell limit on a char boundary.
fn fit_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn write_row(
    worksheet: &mut Worksheet,
    row: u32,
    record: &EnrichedRecord,
    formats: &CellFormats,
) -> std::result::Result<(), XlsxError> {
    let message = &record.record;
    worksheet.write_datetime_with_format(row, 0, &excel_date(message.date)?, &formats.date)?;
    worksheet.write_datetime_with_format(row, 1, &excel_time(message.time)?, &formats.time)?;
    worksheet.write_string(row, 2, &message.sender)?;
    let body = fit_cell(&message.message);
    if body.len() < message.message.len() {
        warn!(
            row,
            sender = %message.sender,
            chars = record.message_length,
            "message truncated to the spreadsheet cell limit"
        );
    }
    worksheet.write_string_with_format(row, 3, body, &formats.message)?;
    worksheet.write_datetime_with_format(
        row,
        4,
        &excel_datetime(record.full_datetime)?,
        &formats.datetime,
    )?;
    // Length of the full message, not of the cell
    worksheet.write_number(row, 5, record.message_length as f64)?;
    Ok(())
}

/// Cell values as they are displayed, one entry per column.
fn rendered_values(record: &EnrichedRecord) -> [String; 6] {
    let message = &record.record;
    [
        message.date.format(DATE_FORMAT).to_string(),
        message.time.format(TIME_FORMAT).to_string(),
        message.sender.clone(),
        message.message.clone(),
        record.full_datetime.format(DATETIME_FORMAT).to_string(),
        record.message_length.to_string(),
    ]
}

/// Longest rendered value per column (header included) plus padding,
/// capped at `max_width`.
pub fn column_widths(table: &ChatTable, max_width: usize) -> [usize; 6] {
    let mut longest = COLUMNS.map(|header| header.chars().count());
    for record in table {
        for (col, value) in rendered_values(record).iter().enumerate() {
            longest[col] = longest[col].max(value.chars().count());
        }
    }
    longest.map(|len| (len + 2).min(max_width))
}

impl TableWriter for XlsxTableWriter {
    fn write(&self, table: &ChatTable) -> Result<()> {
        let temp_path = self.temp_path();
        debug!(path = %temp_path.display(), rows = table.len(), "building workbook");

        let saved = self
            .build_workbook(table)
            .and_then(|mut workbook| workbook.save(&temp_path))
            .map_err(|e| ChatError::Export(e.to_string()))
            .and_then(|()| {
                fs::rename(&temp_path, &self.output_path).map_err(|e| {
                    ChatError::Export(format!(
                        "could not move workbook to {}: {e}",
                        self.output_path.display()
                    ))
                })
            });

        if saved.is_err() {
            // The destination is only ever replaced by a complete workbook
            let _ = fs::remove_file(&temp_path);
        } else {
            info!(path = %self.output_path.display(), rows = table.len(), "wrote spreadsheet");
        }
        saved
    }
}
