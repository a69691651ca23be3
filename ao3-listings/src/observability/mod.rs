//! Observability utilities.

mod observer;
mod tracing;

pub use observer::{
    LoggingTraversalObserver, NoOpTraversalObserver, RetryCause, TraversalObserver,
};
pub use self::tracing::{init_logging, LogFormat, SpanTimer};
