pub mod classifier;
pub mod decoder;
pub mod matcher;
pub mod processor;

pub use decoder::PayloadLayout;
pub use processor::AdvertisementProcessor;
