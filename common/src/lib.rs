pub mod logger;

pub use logger::{TraceId, child_span, cycle_span, init_logger, warn_if_slow};
