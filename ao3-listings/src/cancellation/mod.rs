//! Cooperative cancellation for long-running traversals.

mod token;

pub use token::CancellationToken;
