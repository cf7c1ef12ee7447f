pub mod csv_writer;
pub mod dedup;

use crate::app::Result;
use crate::domain::LeadRecord;

pub use csv_writer::CsvLeadWriter;
pub use dedup::DedupIndex;

/// Destination for accepted leads.
pub trait LeadStore {
    fn append(&mut self, record: &LeadRecord) -> Result<()>;
}
