//! Run summaries reported at the end of directory and assembly runs.

use std::fmt;

/// Outcome counts for a directory build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectorySummary {
    /// Listing pages fetched successfully (including pagination).
    pub listings_fetched: usize,
    /// Listing pages that failed to fetch or held no matching link.
    pub listings_failed: usize,
    /// Distinct detail urls seen on listings this run.
    pub discovered: usize,
    /// Entries newly added to the directory.
    pub added: usize,
    /// Directory size after the merge.
    pub total: usize,
}

impl fmt::Display for DirectorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listing pages ({} failed), {} links discovered, {} new, {} total",
            self.listings_fetched + self.listings_failed,
            self.listings_failed,
            self.discovered,
            self.added,
            self.total
        )
    }
}

/// Outcome counts for a table assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    /// Rows for which a fetch was attempted.
    pub attempted: usize,
    /// Rows extracted successfully.
    pub succeeded: usize,
    /// Rows omitted because the detail page could not be fetched.
    pub failed: usize,
    /// Rows carried over from a previous results file without fetching.
    pub reused: usize,
}

impl AssemblySummary {
    /// Rows written to the results table.
    pub fn rows(&self) -> usize {
        self.succeeded + self.reused
    }
}

impl fmt::Display for AssemblySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} pages extracted ({} failed)",
            self.succeeded, self.attempted, self.failed
        )?;
        if self.reused > 0 {
            write!(f, ", {} rows reused", self.reused)?;
        }
        Ok(())
    }
}
