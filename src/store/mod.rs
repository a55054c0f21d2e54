//! The visit record store: CSV loading, validation and snapshot caching.
//!
//! The store reads the source through Arrow's CSV reader with an explicit
//! schema and a projection onto the required columns, deserializes the
//! resulting batches into typed rows with `serde_arrow`, and validates
//! dates, satisfaction domain and stay direction once at load time. The
//! snapshot is immutable afterwards; every downstream view is a copy.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use itertools::Itertools;
use log::{debug, info};
use serde::Deserialize;

use crate::config::LoadConfig;
use crate::error::{AnalyticsError, Result};
use crate::models::{DatasetSummary, PatientRecord};

/// Columns every visit source must provide, in canonical order
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "patient_id",
    "name",
    "age",
    "service",
    "arrival_date",
    "departure_date",
    "satisfaction",
];

/// Number of rows sampled when inferring the source schema
const SCHEMA_SAMPLE_ROWS: usize = 100;

/// Row shape produced by the CSV reader before date parsing and validation
#[derive(Debug, Deserialize)]
struct RawVisitRow {
    patient_id: String,
    name: Option<String>,
    age: i64,
    service: String,
    arrival_date: String,
    departure_date: String,
    satisfaction: i64,
}

/// Identity of a source file, used to memoize the loaded snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceFingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceFingerprint {
    fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Immutable snapshot of a visit dataset, cached against its source file
///
/// Loading is memoized on the source fingerprint: [`VisitStore::refresh`]
/// re-parses only when the file changed, [`VisitStore::reload`] re-parses
/// unconditionally. The caching is not observable in results; repeated
/// loads of an unchanged source yield identical snapshots.
#[derive(Debug)]
pub struct VisitStore {
    path: PathBuf,
    config: LoadConfig,
    records: Vec<PatientRecord>,
    fingerprint: SourceFingerprint,
}

impl VisitStore {
    /// Open a visit CSV with the default load configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, LoadConfig::default())
    }

    /// Open a visit CSV with an explicit load configuration
    pub fn open_with_config(path: impl AsRef<Path>, config: LoadConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnalyticsError::DataLoad(format!(
                "source not found: {}",
                path.display()
            )));
        }

        let start = Instant::now();
        let fingerprint = SourceFingerprint::of(path)?;
        let records = load_records(path, &config)?;
        info!(
            "Loaded {} patient records from {} in {:?}",
            records.len(),
            path.display(),
            start.elapsed()
        );

        Ok(Self {
            path: path.to_path_buf(),
            config,
            records,
            fingerprint,
        })
    }

    /// The cached snapshot
    #[must_use]
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    /// Path of the underlying source file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-parse the source only if its fingerprint changed
    ///
    /// Returns `true` when a re-parse happened.
    pub fn refresh(&mut self) -> Result<bool> {
        let current = SourceFingerprint::of(&self.path)?;
        if current == self.fingerprint {
            debug!("Source unchanged, keeping cached snapshot");
            return Ok(false);
        }
        self.records = load_records(&self.path, &self.config)?;
        self.fingerprint = current;
        info!(
            "Source changed, reloaded {} patient records",
            self.records.len()
        );
        Ok(true)
    }

    /// Re-parse the source unconditionally
    pub fn reload(&mut self) -> Result<()> {
        self.fingerprint = SourceFingerprint::of(&self.path)?;
        self.records = load_records(&self.path, &self.config)?;
        Ok(())
    }

    /// Facts the presentation layer needs to build its filter widgets
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let services: Vec<String> = self
            .records
            .iter()
            .map(|r| r.service.clone())
            .sorted()
            .dedup()
            .collect();
        DatasetSummary {
            record_count: self.records.len(),
            services,
            age_min: self.records.iter().map(|r| r.age).min().unwrap_or(0),
            age_max: self.records.iter().map(|r| r.age).max().unwrap_or(0),
        }
    }
}

/// Read, deserialize and validate every row of the source
fn load_records(path: &Path, config: &LoadConfig) -> Result<Vec<PatientRecord>> {
    let (file_schema, projection) = validated_schema(path)?;

    let file = File::open(path)?;
    let reader = ReaderBuilder::new(Arc::new(file_schema))
        .with_header(true)
        .with_batch_size(config.batch_size)
        .with_projection(projection)
        .build(file)?;

    let mut records = Vec::new();
    let mut row_offset = 0usize;
    for batch in reader {
        let batch = batch?;
        let rows: Vec<RawVisitRow> = serde_arrow::from_record_batch(&batch)?;
        for (i, raw) in rows.into_iter().enumerate() {
            records.push(convert_row(raw, row_offset + i + 1, config)?);
        }
        row_offset += batch.num_rows();
    }
    Ok(records)
}

/// Infer the source schema, check the required columns are present and
/// build the typed read schema plus the projection onto the required
/// columns. Extra columns are ignored by the projection, which is what
/// makes exported files (input columns plus derived columns) re-loadable.
fn validated_schema(path: &Path) -> Result<(Schema, Vec<usize>)> {
    let mut file = File::open(path)?;
    let format = Format::default().with_header(true);
    let (inferred, _) = format
        .infer_schema(&mut file, Some(SCHEMA_SAMPLE_ROWS))
        .map_err(|e| AnalyticsError::DataLoad(format!("cannot read CSV header: {e}")))?;

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| inferred.field_with_name(name).is_err())
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnalyticsError::MissingColumns(missing));
    }

    // Integers for the numeric columns, strings for everything else; dates
    // stay textual so parse failures can report row and value.
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            let data_type = match f.name().as_str() {
                "age" | "satisfaction" => DataType::Int64,
                _ => DataType::Utf8,
            };
            Field::new(f.name(), data_type, true)
        })
        .collect();
    let schema = Schema::new(fields);

    let projection = REQUIRED_COLUMNS
        .iter()
        .map(|name| schema.index_of(name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((schema, projection))
}

/// Turn a raw CSV row into a validated `PatientRecord`
///
/// `row` is the 1-based data row index, for error reporting.
fn convert_row(raw: RawVisitRow, row: usize, config: &LoadConfig) -> Result<PatientRecord> {
    let arrival_date = parse_date(&raw.arrival_date, "arrival_date", row, config)?;
    let departure_date = parse_date(&raw.departure_date, "departure_date", row, config)?;

    if departure_date < arrival_date {
        return Err(AnalyticsError::NegativeStay {
            patient_id: raw.patient_id,
            arrival: arrival_date,
            departure: departure_date,
        });
    }

    let age = u32::try_from(raw.age).map_err(|_| {
        AnalyticsError::DataLoad(format!(
            "row {row}: age {} is outside the valid range",
            raw.age
        ))
    })?;

    if config.enforce_satisfaction_domain && !(0..=100).contains(&raw.satisfaction) {
        return Err(AnalyticsError::DataLoad(format!(
            "row {row}: satisfaction {} is outside the 0-100 domain",
            raw.satisfaction
        )));
    }
    let satisfaction = u32::try_from(raw.satisfaction).map_err(|_| {
        AnalyticsError::DataLoad(format!(
            "row {row}: satisfaction {} is outside the valid range",
            raw.satisfaction
        ))
    })?;

    Ok(PatientRecord {
        patient_id: raw.patient_id,
        name: raw.name.filter(|n| !n.is_empty()),
        age,
        service: raw.service,
        arrival_date,
        departure_date,
        satisfaction,
    })
}

fn parse_date(value: &str, column: &str, row: usize, config: &LoadConfig) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, &config.date_format).map_err(|_| AnalyticsError::DateParse {
        column: column.to_string(),
        row,
        value: value.to_string(),
        format: config.date_format.clone(),
    })
}
