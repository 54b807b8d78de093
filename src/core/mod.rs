// Core resolution exports
pub mod coordinator;
pub mod resolver;
pub mod stats;
pub mod tiers;

pub use coordinator::{decode_outcome, encode_outcome, CacheAside, CacheKey, DEFAULT_OUTCOME_TTL};
pub use resolver::{MatchResolver, ResolveError};
pub use stats::ResolutionStats;
pub use tiers::{find_date_match, find_full_match, select_fuzzy_match};
