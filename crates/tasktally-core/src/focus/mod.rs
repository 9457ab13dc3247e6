mod engine;

pub use engine::{FocusEvent, FocusState, FocusStatus, FocusTimer};

/// Length of a focus session unless configured otherwise.
pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
