//! Core business logic abstractions

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod log;
pub mod portfolio;
pub mod quote;

// Re-export main types for cleaner imports
pub use cache::{CacheKey, QuoteCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{QuoteError, UpstreamError};
pub use quote::{AssetClass, Quote, QuoteProvider};
