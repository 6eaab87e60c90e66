use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    configuration::Config,
    error::Error,
    helpers::{flatten_record, format_timestamp},
    model::{Schema, Table, TIMESTAMP_COLUMN},
};

/// Append-only CSV log of listing snapshots.
#[derive(Debug)]
pub struct AppendStore {
    pub path: PathBuf,
    pub schema: Schema,
    last_timestamp: Option<DateTime<Utc>>,
}

impl AppendStore {
    pub fn new(path: impl AsRef<Path>, schema: Schema) -> AppendStore {
        AppendStore {
            path: path.as_ref().to_path_buf(),
            schema,
            last_timestamp: None,
        }
    }

    pub fn from_config(config: &Config) -> AppendStore {
        AppendStore::new(config.output_path(), Schema::v1(&config.convert))
    }

    /// Writes one batch, all rows stamped with the same capture time.
    ///
    /// Returns the timestamp used, or `None` for an empty batch.
    pub fn store(
        &mut self,
        records: &[Value],
    ) -> Result<Option<DateTime<Utc>>, Error> {
        if records.is_empty() {
            return Ok(None);
        }

        let timestamp = self.next_timestamp();
        let stamp = format_timestamp(&timestamp);

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(self.project(record, &stamp)?);
        }

        let is_new = self.is_new_file()?;
        let file = if is_new {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&self.path)?
        } else {
            let header = self.read_header()?;
            if let Err(Error::SchemaMismatch(reason)) =
                self.schema.check_header(&header)
            {
                return Err(Error::SchemaMismatch(format!(
                    "{}: {}",
                    self.path.display(),
                    reason
                )));
            }
            let mut file = OpenOptions::new()
                .read(true)
                .append(true)
                .open(&self.path)?;
            if !ends_with_newline(&mut file)? {
                warn!(
                    "Unterminated last line in {}, closing it before append",
                    self.path.display()
                );
                file.write_all(b"\n")?;
            }
            file
        };

        let mut writer = csv::Writer::from_writer(file);

        if is_new {
            writer.write_record(&self.schema.columns)?;
        }

        for row in &rows {
            writer.write_record(row)?;
        }

        writer.flush()?;
        self.last_timestamp = Some(timestamp);

        info!(
            "Stored {} rows at {} in {}",
            rows.len(),
            stamp,
            self.path.display()
        );

        Ok(Some(timestamp))
    }

    /// Reads the whole file back. A missing or empty file is the empty
    /// state, not an error. Rows whose width differs from the header are
    /// skipped.
    pub fn load(&self) -> Result<Option<Table>, Error> {
        if !self.path.is_file() || self.is_new_file()? {
            warn!("No data file found: {}", self.path.display());
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let headers = reader
            .headers()?
            .iter()
            .map(|header| header.to_owned())
            .collect();
        let mut table = Table::new(headers);

        if table.headers.is_empty() {
            warn!("No data file found: {}", self.path.display());
            return Ok(None);
        }

        for record in reader.records() {
            let record = record?;
            if record.len() != table.headers.len() {
                warn!(
                    "Skipping line {} of {}: {} cells, expected {}",
                    record.position().map(|p| p.line()).unwrap_or_default(),
                    self.path.display(),
                    record.len(),
                    table.headers.len()
                );
                continue;
            }
            table
                .rows
                .push(record.iter().map(|cell| cell.to_owned()).collect());
        }

        info!("Loaded {} rows from {}", table.len(), self.path.display());

        Ok(Some(table))
    }

    fn project(&self, record: &Value, stamp: &str) -> Result<Vec<String>, Error> {
        let mut cells = flatten_record(record)?;

        let row = self
            .schema
            .columns
            .iter()
            .map(|column| {
                if column == TIMESTAMP_COLUMN {
                    stamp.to_owned()
                } else {
                    cells.remove(column).unwrap_or_default()
                }
            })
            .collect();

        Ok(row)
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        }
    }

    fn is_new_file(&self) -> Result<bool, Error> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(metadata.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn read_header(&self) -> Result<Vec<String>, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let header = reader.headers()?.iter().map(|h| h.to_owned()).collect();

        Ok(header)
    }
}

fn ends_with_newline(file: &mut File) -> Result<bool, Error> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;

    Ok(last[0] == b'\n')
}
