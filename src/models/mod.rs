pub mod record;

pub use record::{EnrichedRecord, FieldMap, SourceFailure, SourceResult, VendorType};
