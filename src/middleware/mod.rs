pub mod tracing;

pub use self::tracing::{trace_requests, ColoredFields};
