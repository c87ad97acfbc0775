use crate::config::OutputConfig;
use crate::error::Result;
use crate::types::VenueRecord;
use metrics::counter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Non-empty value count for one output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub column: &'static str,
    pub filled: usize,
}

/// Collects records in arrival order and writes them as CSV with a fixed
/// column list. Every save rewrites the whole file.
pub struct RecordSink {
    records: Vec<VenueRecord>,
    columns: Vec<&'static str>,
    checkpoint_every: usize,
    checkpoint_path: PathBuf,
    output_path: PathBuf,
    checkpoints_written: usize,
}

impl RecordSink {
    pub fn new(columns: Vec<&'static str>, output: &OutputConfig) -> Self {
        Self {
            records: Vec::new(),
            columns,
            checkpoint_every: output.checkpoint_every.max(1),
            checkpoint_path: output.checkpoint_path.clone(),
            output_path: output.output_path.clone(),
            checkpoints_written: 0,
        }
    }

    pub fn records(&self) -> &[VenueRecord] {
        &self.records
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn checkpoints_written(&self) -> usize {
        self.checkpoints_written
    }

    /// Appends a record; every `checkpoint_every` records the checkpoint file
    /// is overwritten. A failed checkpoint is logged and the crawl goes on.
    /// Returns whether a checkpoint was written.
    pub fn push(&mut self, record: VenueRecord) -> bool {
        self.records.push(record);
        if self.records.len() % self.checkpoint_every != 0 {
            return false;
        }
        match self.checkpoint() {
            Ok(written) => {
                if written {
                    info!("Progress saved ({} venues scraped)", self.records.len());
                }
                written
            }
            Err(e) => {
                warn!("Failed to write checkpoint {}: {}", self.checkpoint_path.display(), e);
                false
            }
        }
    }

    pub fn checkpoint(&mut self) -> Result<bool> {
        let path = self.checkpoint_path.clone();
        let written = self.save_to(&path)?;
        if written {
            self.checkpoints_written += 1;
            counter!("shadliq_checkpoints_total").increment(1);
        }
        Ok(written)
    }

    /// Writes the final output file.
    pub fn finish(&self) -> Result<bool> {
        self.save_to(&self.output_path)
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Overwrites `path` with every record so far. Nothing is written when
    /// there are no records.
    pub fn save_to(&self, path: &Path) -> Result<bool> {
        if self.records.is_empty() {
            warn!("No data to save to {}", path.display());
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        debug!("Saving {} venues to {}", self.records.len(), path.display());
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for record in &self.records {
            writer.write_record(record.row(&self.columns))?;
        }
        writer.flush()?;

        info!("Data saved: {} venues written to {}", self.records.len(), path.display());
        self.report_coverage();
        Ok(true)
    }

    pub fn coverage(&self) -> Vec<Coverage> {
        self.columns
            .iter()
            .map(|&column| Coverage {
                column,
                filled: self
                    .records
                    .iter()
                    .filter(|r| !r.get(column).is_empty())
                    .count(),
            })
            .collect()
    }

    fn report_coverage(&self) {
        info!("Data summary: {} venues", self.records.len());
        for Coverage { column, filled } in self.coverage() {
            info!("  - venues with {}: {}", column, filled);
        }
    }
}
