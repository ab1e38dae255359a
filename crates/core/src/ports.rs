use crate::domain::ChatTable;
use crate::error::ChatError;

pub type Result<T> = std::result::Result<T, ChatError>;

pub trait TranscriptSource: Send {
    // Reads the whole transcript as decoded lines, in file order
    fn read_lines(&self) -> Result<Vec<String>>;
}

/// Trait for writing the enriched table
/// This is a port (interface) that defines how the core communicates with output adapters
pub trait TableWriter: Send + Sync {
    fn write(&self, table: &ChatTable) -> Result<()>;
}
