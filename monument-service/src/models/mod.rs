pub mod monument;
pub mod request;

pub use monument::{Confidence, MonumentRecord, RecordError};
pub use request::IdentifyRequest;
