use chatsheet_core::analysis::ChatAnalyzer;
use chatsheet_core::application::{load_table, spawn_conversion, ConversionReport};
use chatsheet_core::domain::ChatTable;
use chatsheet_core::error::ChatError;
use chatsheet_core::ports::{Result, TableWriter, TranscriptSource};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use transcript_adapter::TranscriptFileSource;
use xlsx_adapter::{ExportOptions, XlsxTableWriter};

/// CLI tool to convert exported chat transcripts into spreadsheets and answer questions about them
#[derive(Parser, Debug)]
#[command(name = "chatsheet")]
#[command(about = "Converts chat exports (.txt or .zip) to Excel and answers simple questions about them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a transcript into a styled .xlsx workbook
    Convert {
        /// Path to the exported chat (.txt or .zip)
        #[arg(short = 'i', long = "input", required = true)]
        input: PathBuf,

        /// Path where the workbook will be written
        #[arg(short = 'o', long = "output", required = true)]
        output: PathBuf,

        /// Worksheet name
        #[arg(long = "sheet-name", default_value = "WhatsApp Chat")]
        sheet_name: String,

        /// Maximum auto-sized column width, in characters
        #[arg(long = "max-width", default_value_t = 50)]
        max_width: usize,

        /// Question to answer once the conversion finishes (repeatable)
        #[arg(long = "ask")]
        ask: Vec<String>,

        /// Read further questions from stdin after converting
        #[arg(long)]
        interactive: bool,

        /// Treat a transcript without any messages as an error
        #[arg(long = "fail-on-empty")]
        fail_on_empty: bool,
    },
    /// Answer questions about a transcript without exporting it
    Ask {
        /// Path to the exported chat (.txt or .zip)
        #[arg(short = 'i', long = "input", required = true)]
        input: PathBuf,

        /// Questions, e.g. "who is top sender"
        #[arg(required = true)]
        queries: Vec<String>,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();
}

/// Converts on a worker thread while a spinner runs.
fn convert_with_spinner(
    source: Box<dyn TranscriptSource>,
    table_writer: Box<dyn TableWriter>,
) -> Result<ConversionReport> {
    let handle = spawn_conversion(source, table_writer);

    let pb = ProgressBar::new_spinner().with_message("Converting... Please wait.");
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = handle.wait();
    pb.finish_and_clear();
    result
}

fn answer_all(table: &ChatTable, queries: &[String]) {
    let analyzer = ChatAnalyzer::new(Some(table));
    for query in queries {
        println!("You: {query}");
        println!("Bot: {}\n", analyzer.respond(query));
    }
}

fn interactive_loop(table: &ChatTable) -> io::Result<()> {
    let analyzer = ChatAnalyzer::new(Some(table));
    println!("Analysis ready! You can ask questions now.\nविश्लेषण तैयार है! अब आप प्रश्न पूछ सकते हैं।");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }
        println!("{}\n", analyzer.respond(query));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert {
            input,
            output,
            sheet_name,
            max_width,
            ask,
            interactive,
            fail_on_empty,
        } => {
            // Instantiate concrete implementations of secondary adapters
            let source: Box<dyn TranscriptSource> = Box::new(TranscriptFileSource::new(input));
            let options = ExportOptions {
                sheet_name,
                max_column_width: max_width,
            };
            let table_writer: Box<dyn TableWriter> =
                Box::new(XlsxTableWriter::new(output.clone()).with_options(options));

            let report = convert_with_spinner(source, table_writer)?;
            if report.is_empty() {
                if fail_on_empty {
                    return Err(ChatError::EmptyResult);
                }
                eprintln!("Warning: no messages were recognised in the transcript");
            }
            println!(
                "Successfully converted {} messages to {}",
                report.records(),
                output.display()
            );

            answer_all(&report.table, &ask);
            if interactive {
                interactive_loop(&report.table)
                    .map_err(|e| ChatError::source_read("<stdin>", e))?;
            }
            Ok(())
        }
        Command::Ask { input, queries } => {
            let table = load_table(&TranscriptFileSource::new(input))?;
            answer_all(&table, &queries);
            Ok(())
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "starting chatsheet");

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
