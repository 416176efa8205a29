mod client;

pub use client::{normalize_url, HttpClient, HttpClientBuilder, API_KEY_HEADER, DEFAULT_API_PREFIX};
