// 📥 Bulk Ingestion Pipeline - CSV dataset → registry (bootstrap only)
//
// Runs once against an empty store. Every row is checked on its own: a bad
// row is counted and skipped, never fatal. Only a source that cannot be read
// aborts the run; whatever batches were already flushed stay loaded.

use crate::entities::{embedded_country, has_valid_length, SwiftCodeEntry};
use crate::store::RegistryStore;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Column order of the source dataset
pub const SOURCE_COLUMNS: [&str; 8] = [
    "COUNTRY ISO2 CODE",
    "SWIFT CODE",
    "CODE TYPE",
    "NAME",
    "ADDRESS",
    "TOWN NAME",
    "COUNTRY NAME",
    "TIME ZONE",
];

/// Columns up to COUNTRY NAME must be present; TIME ZONE may be cut off
const REQUIRED_COLUMNS: usize = 7;

/// Rows are read by position, so the header must name the required columns in order
fn check_header(headers: &StringRecord) -> Result<()> {
    for (i, expected) in SOURCE_COLUMNS.iter().take(REQUIRED_COLUMNS).enumerate() {
        let found = headers.get(i).unwrap_or("");
        if !found.eq_ignore_ascii_case(expected) {
            bail!(
                "Unexpected CSV header in column {}: expected '{}', found '{}'",
                i + 1,
                expected,
                found
            );
        }
    }
    Ok(())
}

// ============================================================================
// SOURCE ROW
// ============================================================================

/// One dataset row, by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow<'a> {
    pub country_iso2: &'a str,
    pub swift_code: &'a str,
    pub code_type: &'a str,
    pub bank_name: &'a str,
    pub address: &'a str,
    pub town_name: &'a str,
    pub country_name: &'a str,
    pub time_zone: &'a str,
}

impl<'a> SourceRow<'a> {
    pub fn from_record(record: &'a StringRecord) -> std::result::Result<Self, RowError> {
        if record.len() < REQUIRED_COLUMNS {
            return Err(RowError::Malformed(format!(
                "expected at least {} columns, found {}",
                REQUIRED_COLUMNS,
                record.len()
            )));
        }

        let field = move |i: usize| record.get(i).unwrap_or("");

        Ok(SourceRow {
            country_iso2: field(0),
            swift_code: field(1),
            code_type: field(2),
            bank_name: field(3),
            address: field(4),
            town_name: field(5),
            country_name: field(6),
            time_zone: field(7),
        })
    }
}

// ============================================================================
// ROW ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SkipReason {
    MissingField,
    InvalidLength,
    CountryMismatch,
    MalformedRecord,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing critical data (SWIFT, ISO2, BankName, or CountryName)")]
    MissingField,

    #[error("invalid SWIFT code length ('{0}'), expected 8 or 11 characters")]
    InvalidLength(String),

    #[error("SWIFT code country part ('{embedded}') does not match provided Country ISO2 ('{iso2}')")]
    CountryMismatch { embedded: String, iso2: String },

    #[error("malformed record: {0}")]
    Malformed(String),
}

impl RowError {
    pub fn reason(&self) -> SkipReason {
        match self {
            RowError::MissingField => SkipReason::MissingField,
            RowError::InvalidLength(_) => SkipReason::InvalidLength,
            RowError::CountryMismatch { .. } => SkipReason::CountryMismatch,
            RowError::Malformed(_) => SkipReason::MalformedRecord,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Turn a source row into an entry, or say why it is skipped
pub fn parse_row(row: &SourceRow<'_>) -> std::result::Result<SwiftCodeEntry, RowError> {
    let code = row.swift_code.trim();

    if code.is_empty()
        || row.country_iso2.trim().is_empty()
        || row.bank_name.trim().is_empty()
        || row.country_name.trim().is_empty()
    {
        return Err(RowError::MissingField);
    }

    if !has_valid_length(code) {
        return Err(RowError::InvalidLength(code.to_string()));
    }

    let embedded = embedded_country(code).unwrap_or_default();
    if !embedded.eq_ignore_ascii_case(row.country_iso2.trim()) {
        return Err(RowError::CountryMismatch {
            embedded,
            iso2: row.country_iso2.to_string(),
        });
    }

    Ok(SwiftCodeEntry::new(
        code,
        row.bank_name.to_string(),
        non_blank(row.address),
        non_blank(row.town_name),
        row.country_iso2.trim(),
        row.country_name.trim(),
    ))
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub rows_seen: u64,
    pub rows_loaded: u64,
    pub rows_skipped: u64,
    /// Valid rows whose code was already stored (earlier batch or earlier row)
    pub duplicates: u64,
    pub batches_flushed: u64,
    pub skip_reasons: BTreeMap<SkipReason, u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl IngestionReport {
    fn new() -> Self {
        IngestionReport {
            rows_seen: 0,
            rows_loaded: 0,
            rows_skipped: 0,
            duplicates: 0,
            batches_flushed: 0,
            skip_reasons: BTreeMap::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    fn record_skip(&mut self, reason: SkipReason) {
        self.rows_skipped += 1;
        *self.skip_reasons.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped_for(&self, reason: SkipReason) -> u64 {
        self.skip_reasons.get(&reason).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Total records processed: {}. Records successfully loaded: {}. Errors/Skipped: {}. Duplicates: {}. Batches: {}",
            self.rows_seen, self.rows_loaded, self.rows_skipped, self.duplicates, self.batches_flushed
        )
    }
}

#[derive(Debug, Clone)]
pub enum IngestionOutcome {
    /// Store already held records; nothing was read
    AlreadyPopulated { existing: i64 },
    Completed(IngestionReport),
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct IngestionPipeline<'a> {
    store: &'a dyn RegistryStore,
    batch_size: usize,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(store: &'a dyn RegistryStore) -> Self {
        IngestionPipeline {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Load the dataset only if the store is empty
    pub fn ingest_if_empty(&self, csv_path: &Path) -> Result<IngestionOutcome> {
        let existing = self.store.count()?;
        if existing > 0 {
            tracing::info!(
                "Database already contains {} records. Skipping initialization.",
                existing
            );
            return Ok(IngestionOutcome::AlreadyPopulated { existing });
        }

        tracing::info!(
            "Database is empty. Initializing data from CSV: {}",
            csv_path.display()
        );
        let file = File::open(csv_path)
            .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

        let report = self.ingest_reader(file)?;
        Ok(IngestionOutcome::Completed(report))
    }

    /// Load every row of `reader` regardless of current store content
    pub fn ingest_reader<R: Read>(&self, reader: R) -> Result<IngestionReport> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        check_header(rdr.headers().context("Failed to read CSV header")?)?;

        let mut report = IngestionReport::new();
        let mut batch: Vec<SwiftCodeEntry> = Vec::with_capacity(self.batch_size);

        for result in rdr.records() {
            report.rows_seen += 1;
            let record_number = report.rows_seen;

            let record = match result {
                Ok(record) => record,
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(e).context("Failed to read CSV source");
                }
                Err(e) => {
                    tracing::warn!("Record {}: Skipping unreadable record: {}", record_number, e);
                    report.record_skip(SkipReason::MalformedRecord);
                    continue;
                }
            };

            let parsed = SourceRow::from_record(&record).and_then(|row| parse_row(&row));
            match parsed {
                Ok(entry) => {
                    batch.push(entry);
                    if batch.len() >= self.batch_size {
                        self.flush(&mut batch, &mut report)?;
                    }
                }
                Err(e) => {
                    tracing::warn!("Record {}: Skipping record: {}", record_number, e);
                    report.record_skip(e.reason());
                }
            }
        }

        if !batch.is_empty() {
            tracing::info!("Saving final batch of {} records.", batch.len());
            self.flush(&mut batch, &mut report)?;
        }

        report.finished_at = Some(Utc::now());
        tracing::info!("Finished processing CSV file. {}", report.summary());

        Ok(report)
    }

    fn flush(&self, batch: &mut Vec<SwiftCodeEntry>, report: &mut IngestionReport) -> Result<()> {
        let inserted = self
            .store
            .save_batch(batch)
            .with_context(|| format!("Failed to save batch of {} records", batch.len()))?;

        report.rows_loaded += inserted as u64;
        report.duplicates += (batch.len() - inserted) as u64;
        report.batches_flushed += 1;
        tracing::debug!("Saved batch of {} records.", inserted);

        batch.clear();
        Ok(())
    }
}
