pub mod health;
pub mod identify;
pub mod metrics;
