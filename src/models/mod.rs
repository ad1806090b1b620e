//! Data models for vtolscrape.

mod directory;
mod record;
mod summary;

pub use directory::{Directory, DirectoryEntry};
pub use record::{AircraftRecord, ResultsTable};
pub use summary::{AssemblySummary, DirectorySummary};
