pub mod adapters;
pub mod configuration;
pub mod core;
pub mod render;
pub mod utils;

pub use reqwest::Client;
