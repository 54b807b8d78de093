use thiserror::Error;

use crate::core::tiers::select_fuzzy_match;
use crate::models::{CheckRequest, MatchKind, MatchOutcome};
use crate::services::{DataAccessError, ExactLookup, SimilaritySearch};

/// Resolution failed because a provider failed; never cached
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

/// Match resolution engine - implements the tiered decision policy
///
/// # Tiers
/// 1. Exact: identity number lookup
/// 2. Fuzzy-full: similarity candidate with equal birth place and birth date
/// 3. Fuzzy-date: similarity candidate with equal birth date
/// 4. None
#[derive(Debug, Clone)]
pub struct MatchResolver<X, S> {
    exact: X,
    similar: S,
}

impl<X, S> MatchResolver<X, S>
where
    X: ExactLookup,
    S: SimilaritySearch,
{
    pub fn new(exact: X, similar: S) -> Self {
        Self { exact, similar }
    }

    /// Classify a request, issuing zero, one or two provider calls
    ///
    /// Provider errors are returned as-is; no degraded answer is produced.
    pub async fn classify(&self, request: &CheckRequest) -> Result<MatchOutcome, ResolveError> {
        if let Some(identity_number) = request.identity_number() {
            if let Some(record) = self.exact.lookup_by_id(identity_number).await? {
                tracing::info!(match_type = %MatchKind::Exact, "Found blacklist record by NIK");
                return Ok(MatchOutcome::exact(record.reason));
            }
        }

        // Without a birth date neither fuzzy tier can fire. The similarity search
        // is skipped on purpose, so such requests make at most one provider call.
        if request.birth_date().is_none() {
            tracing::info!(
                match_type = %MatchKind::None,
                "No birth date supplied, name similarity alone is not decisive"
            );
            return Ok(MatchOutcome::no_match());
        }

        let candidates = self
            .similar
            .search_similar(request.name(), request.birth_place(), request.birth_date())
            .await?;

        tracing::debug!("Similarity search returned {} candidates", candidates.len());

        match select_fuzzy_match(request, &candidates) {
            Some((tier, candidate)) => {
                tracing::info!(
                    match_type = %MatchKind::from(tier),
                    similarity = candidate.similarity_score,
                    "Found blacklist record by fuzzy match"
                );
                Ok(MatchOutcome::fuzzy(tier, candidate.reason.clone()))
            }
            None => {
                tracing::info!(match_type = %MatchKind::None, "No blacklist record found");
                Ok(MatchOutcome::no_match())
            }
        }
    }
}
