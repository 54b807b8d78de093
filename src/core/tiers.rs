use chrono::NaiveDate;
use crate::models::{CandidateRecord, CheckRequest, FuzzyTier};

/// First candidate whose birth place and birth date both equal the request's
///
/// `candidates` must already be in ranking order; the first hit wins.
#[inline]
pub fn find_full_match<'a>(
    candidates: &'a [CandidateRecord],
    birth_place: &str,
    birth_date: NaiveDate,
) -> Option<&'a CandidateRecord> {
    candidates
        .iter()
        .find(|c| c.birth_place == birth_place && c.birth_date == birth_date)
}

/// First candidate whose birth date equals the request's
#[inline]
pub fn find_date_match(
    candidates: &[CandidateRecord],
    birth_date: NaiveDate,
) -> Option<&CandidateRecord> {
    candidates.iter().find(|c| c.birth_date == birth_date)
}

/// Apply the fuzzy tiers over a ranked candidate list
///
/// Fuzzy-full is tried before fuzzy-date. Without a birth date on the request
/// neither tier can fire, so name similarity alone never matches. The
/// similarity score plays no part here; only ordering does.
pub fn select_fuzzy_match<'a>(
    request: &CheckRequest,
    candidates: &'a [CandidateRecord],
) -> Option<(FuzzyTier, &'a CandidateRecord)> {
    let birth_date = request.birth_date()?;

    if let Some(place) = request.birth_place() {
        if let Some(candidate) = find_full_match(candidates, place, birth_date) {
            return Some((FuzzyTier::Full, candidate));
        }
    }

    find_date_match(candidates, birth_date).map(|c| (FuzzyTier::DateOnly, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candidate(place: &str, birth_date: NaiveDate, reason: &str, score: f64) -> CandidateRecord {
        CandidateRecord {
            name: "John Doe".to_string(),
            birth_place: place.to_string(),
            birth_date,
            reason: reason.to_string(),
            similarity_score: Some(score),
        }
    }

    #[test]
    fn test_full_match_preferred_over_earlier_date_match() {
        let request = CheckRequest::new("John Doe")
            .unwrap()
            .with_birth_place("Jakarta")
            .with_birth_date(date(1990, 1, 1));
        let candidates = vec![
            candidate("Bandung", date(1990, 1, 1), "date only", 0.9),
            candidate("Jakarta", date(1990, 1, 1), "full", 0.5),
        ];

        let (kind, hit) = select_fuzzy_match(&request, &candidates).unwrap();
        assert_eq!(kind, FuzzyTier::Full);
        assert_eq!(hit.reason, "full");
    }

    #[test]
    fn test_birth_place_is_exact_string_equality() {
        let request = CheckRequest::new("John Doe")
            .unwrap()
            .with_birth_place("jakarta")
            .with_birth_date(date(1990, 1, 1));
        let candidates = vec![candidate("Jakarta", date(1990, 1, 1), "r", 0.9)];

        let (kind, _) = select_fuzzy_match(&request, &candidates).unwrap();
        assert_eq!(kind, FuzzyTier::DateOnly);
    }

    #[test]
    fn test_no_birth_date_never_matches() {
        let request = CheckRequest::new("John Doe").unwrap().with_birth_place("Jakarta");
        let candidates = vec![candidate("Jakarta", date(1990, 1, 1), "r", 0.99)];

        assert!(select_fuzzy_match(&request, &candidates).is_none());
    }

    #[test]
    fn test_no_birth_place_only_date_tier() {
        let request = CheckRequest::new("John Doe")
            .unwrap()
            .with_birth_date(date(1990, 1, 1));
        let candidates = vec![candidate("Jakarta", date(1990, 1, 1), "r", 0.8)];

        let (kind, _) = select_fuzzy_match(&request, &candidates).unwrap();
        assert_eq!(kind, FuzzyTier::DateOnly);
    }

    #[test]
    fn test_empty_candidates() {
        let request = CheckRequest::new("John Doe")
            .unwrap()
            .with_birth_date(date(1990, 1, 1));
        assert!(select_fuzzy_match(&request, &[]).is_none());
    }
}
