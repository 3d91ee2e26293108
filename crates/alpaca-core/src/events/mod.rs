//! Change events from the realtime feed

mod change_event;

pub use change_event::{ChangeEvent, ChangeKind};
