pub mod cache;
pub mod fetcher;
pub mod web;

pub use cache::{CoverCache, MemoryCache, cover_key};
pub use fetcher::{CoverFetcher, CoverSource};
pub use web::CoverWebServer;
