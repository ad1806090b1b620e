//! Service layer: directory building, record extraction, table assembly and
//! reports.
//!
//! Services take their page source and site definition as arguments and
//! report progress through events or return values, so the CLI only handles
//! presentation.

pub mod assembler;
pub mod directory_builder;
pub mod extractor;
pub mod report;

pub use assembler::{assemble, save_results, AssembleOptions, AssemblyEvent};
pub use directory_builder::{build_directory, discover};
pub use extractor::{extract, extract_record};
pub use report::{null_report, site_status, NullReport, SiteStatus, TableFile};
