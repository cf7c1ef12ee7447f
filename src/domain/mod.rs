pub mod lead;

pub use lead::{Field, FieldValue, LeadRecord, NOT_FOUND, NO_RATING, NO_REVIEWS};
