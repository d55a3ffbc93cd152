pub mod client;
pub mod normalizer;
pub mod series;

pub use client::{HttpPriceFeed, PriceFeed};
pub use normalizer::SeriesNormalizer;
pub use series::PriceSeries;
