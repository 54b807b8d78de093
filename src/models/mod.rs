// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateRecord, CheckRequest, FuzzyTier, InconsistentOutcome, MatchKind, MatchOutcome,
    RequestError, DATE_FORMAT,
};
pub use requests::CheckBlacklistRequest;
pub use responses::{CheckBlacklistResponse, ErrorResponse, HealthResponse};
