//! Value objects - immutable types that represent domain concepts

mod record_id;
pub mod timestamp;

pub use record_id::{RecordId, RecordIdParseError};
pub use timestamp::parse_timestamp;
