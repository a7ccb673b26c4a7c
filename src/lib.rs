// src/lib.rs
pub mod config;
pub mod error;
pub mod fetch;
pub mod holdings;
pub mod output;
pub mod pipeline;
pub mod tickers;

pub use config::{RunConfig, SiteConfig};
pub use error::{Error, ErrorKind, Result, Stage};
pub use pipeline::{run, RunSummary};
