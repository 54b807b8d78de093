use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::domain::{CheckRequest, RequestError, DATE_FORMAT};

/// Request body for the blacklist check endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckBlacklistRequest {
    #[validate(length(min = 3, message = "Name must be at least 3 characters long"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(equal = 16, message = "NIK must be a 16-digit number"))]
    pub nik: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default, deserialize_with = "deserialize_birth_date")]
    pub birth_date: Option<NaiveDate>,
}

impl CheckBlacklistRequest {
    /// Whether the NIK, if present, is made of ASCII digits only
    ///
    /// The length is covered by the validator attribute.
    pub fn nik_is_numeric(&self) -> bool {
        self.nik
            .as_deref()
            .map_or(true, |nik| nik.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn into_check_request(self) -> Result<CheckRequest, RequestError> {
        let mut request = CheckRequest::new(self.name)?;
        if let Some(nik) = self.nik {
            request = request.with_identity_number(nik);
        }
        if let Some(place) = self.birth_place {
            request = request.with_birth_place(place);
        }
        if let Some(date) = self.birth_date {
            request = request.with_birth_date(date);
        }
        Ok(request)
    }
}

/// Accepts `1990-01-01` as well as a full RFC 3339 timestamp, keeping the date part
fn deserialize_birth_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
        return Ok(Some(date));
    }

    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| Some(ts.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid birth_date: {}", raw)))
}
