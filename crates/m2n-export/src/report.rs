//! Export outcome

use m2n_core::AssetKind;
use serde::Serialize;

use crate::policy::WriteOutcome;

/// One file written or kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    pub kind: AssetKind,
    /// Path relative to the export root
    pub path: String,
}

/// One asset that could not be exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    pub kind: AssetKind,
    pub name: String,
    pub message: String,
}

/// Everything an export did, in the order it happened
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub written: Vec<AssetRecord>,
    pub skipped: Vec<AssetRecord>,
    pub failures: Vec<AssetFailure>,
}

impl ExportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: AssetKind, path: impl Into<String>, outcome: WriteOutcome) {
        let record = AssetRecord {
            kind,
            path: path.into(),
        };
        match outcome {
            WriteOutcome::Written => self.written.push(record),
            WriteOutcome::Skipped => self.skipped.push(record),
        }
    }

    pub fn fail(&mut self, kind: AssetKind, name: impl Into<String>, error: impl std::fmt::Display) {
        let failure = AssetFailure {
            kind,
            name: name.into(),
            message: error.to_string(),
        };
        tracing::warn!(kind = %failure.kind, name = %failure.name, error = %failure.message, "Asset failed");
        self.failures.push(failure);
    }

    /// True when no asset failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn written_count(&self, kind: AssetKind) -> usize {
        self.written.iter().filter(|r| r.kind == kind).count()
    }

    pub fn skipped_count(&self, kind: AssetKind) -> usize {
        self.skipped.iter().filter(|r| r.kind == kind).count()
    }

    /// Check if a file was written in this run
    pub fn was_written(&self, path: &str) -> bool {
        self.written.iter().any(|r| r.path == path)
    }

    /// Check if an earlier asset of this run already wrote or kept `path`
    pub fn claims(&self, path: &str) -> bool {
        self.written.iter().chain(&self.skipped).any(|r| r.path == path)
    }
}

impl std::fmt::Display for ExportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for kind in AssetKind::ALL {
            writeln!(
                f,
                "{:<10} {:>4} written {:>4} kept",
                kind.to_string(),
                self.written_count(kind),
                self.skipped_count(kind)
            )?;
        }
        for failure in &self.failures {
            writeln!(f, "FAILED {} '{}': {}", failure.kind, failure.name, failure.message)?;
        }
        Ok(())
    }
}
