use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::app::Result;
use crate::domain::{Field, LeadRecord};
use crate::store::LeadStore;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Append-only CSV output.
///
/// The header row is written only when the file is new or empty; every
/// appended record is flushed before `append` returns.
pub struct CsvLeadWriter {
    writer: csv::Writer<File>,
}

impl CsvLeadWriter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_new = std::fs::metadata(path).map_or(true, |m| m.len() == 0);

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        if is_new {
            file.write_all(UTF8_BOM)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            debug!("Writing header to new output file {}", path.display());
            writer.write_record(Field::headers())?;
            writer.flush()?;
        }

        Ok(Self { writer })
    }
}

impl LeadStore for CsvLeadWriter {
    fn append(&mut self, record: &LeadRecord) -> Result<()> {
        self.writer.write_record(record.row())?;
        self.writer.flush()?;
        Ok(())
    }
}
