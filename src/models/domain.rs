use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar format used wherever a birth date is rendered as text
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised when building a [`CheckRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("name must not be empty")]
    EmptyName,
}

/// A single blacklist check
///
/// Fields are private so a request cannot change once it has been handed to
/// the coordinator. An empty identity number is stored as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    name: String,
    identity_number: Option<String>,
    birth_place: Option<String>,
    birth_date: Option<NaiveDate>,
}

impl CheckRequest {
    pub fn new(name: impl Into<String>) -> Result<Self, RequestError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RequestError::EmptyName);
        }

        Ok(Self {
            name,
            identity_number: None,
            birth_place: None,
            birth_date: None,
        })
    }

    pub fn with_identity_number(mut self, identity_number: impl Into<String>) -> Self {
        let identity_number = identity_number.into();
        self.identity_number = (!identity_number.is_empty()).then_some(identity_number);
        self
    }

    pub fn with_birth_place(mut self, birth_place: impl Into<String>) -> Self {
        self.birth_place = Some(birth_place.into());
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity_number(&self) -> Option<&str> {
        self.identity_number.as_deref()
    }

    pub fn birth_place(&self) -> Option<&str> {
        self.birth_place.as_deref()
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }
}

/// Blacklist entry surfaced by one of the providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub birth_place: String,
    pub birth_date: NaiveDate,
    pub reason: String,
    /// Only set by similarity search, never persisted
    #[serde(skip)]
    pub similarity_score: Option<f64>,
}

/// Which tier of the decision policy produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    FuzzyFull,
    FuzzyDate,
    None,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::FuzzyFull => "fuzzy_full",
            MatchKind::FuzzyDate => "fuzzy_date",
            MatchKind::None => "none",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fuzzy tier fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzyTier {
    /// Birth place and birth date both equal
    Full,
    /// Birth date equal, birth place differs or was not given
    DateOnly,
}

impl From<FuzzyTier> for MatchKind {
    fn from(tier: FuzzyTier) -> Self {
        match tier {
            FuzzyTier::Full => MatchKind::FuzzyFull,
            FuzzyTier::DateOnly => MatchKind::FuzzyDate,
        }
    }
}

/// Raised when a decoded outcome breaks the `none` iff not blacklisted rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("inconsistent outcome: blacklisted={blacklisted} with match_kind={match_kind}")]
pub struct InconsistentOutcome {
    pub blacklisted: bool,
    pub match_kind: MatchKind,
}

/// Wire form of [`MatchOutcome`], validated on the way in
#[derive(Deserialize)]
pub struct OutcomeRecord {
    blacklisted: bool,
    details: String,
    match_kind: MatchKind,
}

/// Result of resolving a [`CheckRequest`]; this is the unit that gets cached
///
/// Fields are private so every value, built or decoded, keeps
/// `match_kind == None` exactly when `blacklisted` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OutcomeRecord")]
pub struct MatchOutcome {
    blacklisted: bool,
    details: String,
    match_kind: MatchKind,
}

impl MatchOutcome {
    pub fn exact(details: impl Into<String>) -> Self {
        Self {
            blacklisted: true,
            details: details.into(),
            match_kind: MatchKind::Exact,
        }
    }

    pub fn fuzzy(tier: FuzzyTier, details: impl Into<String>) -> Self {
        Self {
            blacklisted: true,
            details: details.into(),
            match_kind: tier.into(),
        }
    }

    pub fn no_match() -> Self {
        Self {
            blacklisted: false,
            details: String::new(),
            match_kind: MatchKind::None,
        }
    }

    pub fn is_blacklisted(&self) -> bool {
        self.blacklisted
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn match_kind(&self) -> MatchKind {
        self.match_kind
    }
}

impl TryFrom<OutcomeRecord> for MatchOutcome {
    type Error = InconsistentOutcome;

    fn try_from(record: OutcomeRecord) -> Result<Self, Self::Error> {
        let consistent = match record.match_kind {
            MatchKind::None => !record.blacklisted && record.details.is_empty(),
            _ => record.blacklisted,
        };
        if !consistent {
            return Err(InconsistentOutcome {
                blacklisted: record.blacklisted,
                match_kind: record.match_kind,
            });
        }

        Ok(Self {
            blacklisted: record.blacklisted,
            details: record.details,
            match_kind: record.match_kind,
        })
    }
}
