//! Film records, outcome labels and tabular I/O.
//!
//! A [`Dataset`] is the full ordered collection of [`Record`]s read at
//! startup. It is immutable once loaded and cheap to clone, so one handle can
//! be shared by every pipeline call (including concurrent ones).

pub mod label;
pub mod reader;
pub mod record;
pub mod writer;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::error::{BoxOfficeError, Result};

pub use label::{Label, N_CLASSES, derive_label};
pub use reader::{RecordReader, read_training_set};
pub use record::{Record, RecordDetails};
pub use writer::{export_dashboard, export_imputation, export_records, export_training_set};

/// Read-only handle to the loaded records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Arc<[Record]>,
}

impl Dataset {
    /// Wrap already-parsed records.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Load a comma-delimited file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_delimiter(path, b',')
    }

    /// Load a file with a custom delimiter.
    pub fn load_with_delimiter<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            BoxOfficeError::data_load(format!("cannot open {}: {e}", path.display()))
        })?;
        let dataset = Self::from_reader(BufReader::new(file), delimiter)?;
        info!("loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Read records from any byte source.
    pub fn from_reader<R: Read>(input: R, delimiter: u8) -> Result<Self> {
        let records = RecordReader::new().with_delimiter(delimiter).read(input)?;
        Ok(Self::from_records(records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
