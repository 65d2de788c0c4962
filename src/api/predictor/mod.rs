pub mod client;
pub mod models;

pub use client::PredictorClient;
pub use models::{ApiError, PredictionResponse, SeriesPair};
