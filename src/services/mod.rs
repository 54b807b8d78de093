// Service exports
pub mod cache;
pub mod postgres;
pub mod providers;

pub use cache::CacheManager;
pub use postgres::BlacklistStore;
pub use providers::{CacheError, DataAccessError, ExactLookup, OutcomeCache, SimilaritySearch};
