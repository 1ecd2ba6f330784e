pub mod client;
pub mod models;

pub use client::MeteringClient;
pub use models::MeterReading;
