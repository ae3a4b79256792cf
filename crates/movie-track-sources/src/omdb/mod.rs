pub mod api;
pub mod client;
pub mod parser;

pub use client::{OmdbClient, DEFAULT_BASE_URL};
