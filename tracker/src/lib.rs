pub mod error;
pub mod extremum;
pub mod format;
pub mod history;
pub mod slot;
pub mod store;
pub mod types;

pub use error::TrackerError;
pub use extremum::ExtremumTracker;
pub use slot::{CrossingEvent, Direction, Series, Slot, SlotState, detect_crossing, slot_of};
pub use store::HistoryStore;
pub use types::{AlertKey, ExtremeKind, Notification, Period, Sample};
