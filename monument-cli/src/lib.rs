//! Client side of the monument relay: pick an image, call the relay, show
//! the result.

pub mod capture;
pub mod client;
pub mod render;
pub mod session;
