//! Core types and shared functionality for chorus.
//!
//! This crate provides:
//! - The persistent HTTP response cache with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    CacheDb, CacheEntry, CachedFetcher, CachedResponse, Fetch, FetchOptions, FetchOutcome, Payload,
    PayloadFormat, RawResponse, XmlElement,
};
pub use config::AppConfig;
pub use error::Error;
