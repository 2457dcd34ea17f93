pub mod metrics;
pub mod parser;
pub mod prompt;
pub mod providers;

pub use parser::{parse_monument, ParseOutcome};
