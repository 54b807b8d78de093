//! Blacklist Check - identity blacklist matching service
//!
//! Answers whether a person is blacklisted, either by exact identity number
//! (NIK) or by fuzzy name similarity combined with birth place and birth date.
//! Outcomes are cached cache-aside so repeated checks skip the similarity search.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CacheAside, CacheKey, MatchResolver, ResolutionStats, ResolveError};
pub use crate::models::{CandidateRecord, CheckRequest, MatchKind, MatchOutcome};
