//! Access credentials and expiry arithmetic.
//!
//! A credential is created from a successful login response and replaced
//! wholesale on re-authentication; it is never partially mutated.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

/// Usability margin in hours: a credential must outlive `now + 2h` to be
/// handed out.
///
/// The margin guarantees that a multi-step operation started just before the
/// cutoff (an export poll loop, for instance) never crosses expiry mid-flight.
pub const CREDENTIAL_REFRESH_MARGIN_HOURS: i64 = 2;

fn refresh_margin() -> Duration {
    Duration::hours(CREDENTIAL_REFRESH_MARGIN_HOURS)
}

/// Wire format of the credential expiry, after truncating any
/// fractional-seconds or timezone suffix at the first `.`.
const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors raised while building a credential from a login response.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid expiry date '{0}'")]
    InvalidExpiry(String),

    #[error("Login response is missing the '{0}' field")]
    MissingField(&'static str),
}

/// A time-limited access credential issued by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Public half of the credential, sent in the authorization token.
    pub access_key_id: String,
    /// Secret half, used only to sign requests.
    pub secret_access_key: String,
    /// Server-side expiry instant (naive UTC).
    pub expires_at: NaiveDateTime,
}

impl Credential {
    /// Build a credential from login response fields.
    ///
    /// The raw expiry string is truncated at the first `.` before parsing,
    /// dropping fractional seconds and any timezone suffix the service
    /// appends.
    pub fn from_parts(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        raw_expiry: &str,
    ) -> Result<Self, CredentialError> {
        let expires_at = parse_expiry(raw_expiry)?;
        Ok(Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            expires_at,
        })
    }

    /// Check whether the credential is still usable at `now`.
    ///
    /// Usable means `now + margin <= expires_at`; anything closer to expiry
    /// must be refreshed before signing another request.
    pub fn is_usable(&self, now: NaiveDateTime) -> bool {
        now + refresh_margin() <= self.expires_at
    }
}

/// Parse a service expiry string (`%Y-%m-%dT%H:%M:%S`, suffix truncated).
pub fn parse_expiry(raw: &str) -> Result<NaiveDateTime, CredentialError> {
    let truncated = raw.split('.').next().unwrap_or(raw);
    NaiveDateTime::parse_from_str(truncated, EXPIRY_FORMAT)
        .map_err(|_| CredentialError::InvalidExpiry(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn credential_expiring_in(hours: i64) -> Credential {
        Credential {
            access_key_id: "key".into(),
            secret_access_key: "secret".into(),
            expires_at: Utc::now().naive_utc() + Duration::hours(hours),
        }
    }

    #[test]
    fn test_parse_expiry_truncates_fractional_suffix() {
        let parsed = parse_expiry("2026-08-07T12:30:00.123456Z").unwrap();
        assert_eq!(parsed.format("%Y-%m-%dT%H:%M:%S").to_string(), "2026-08-07T12:30:00");
    }

    #[test]
    fn test_parse_expiry_plain() {
        assert!(parse_expiry("2026-08-07T12:30:00").is_ok());
    }

    #[test]
    fn test_parse_expiry_rejects_garbage() {
        let err = parse_expiry("not-a-date").unwrap_err();
        assert!(matches!(err, CredentialError::InvalidExpiry(_)));
    }

    #[test]
    fn test_credential_one_hour_out_is_stale() {
        let cred = credential_expiring_in(1);
        assert!(!cred.is_usable(Utc::now().naive_utc()));
    }

    #[test]
    fn test_credential_three_hours_out_is_fresh() {
        let cred = credential_expiring_in(3);
        assert!(cred.is_usable(Utc::now().naive_utc()));
    }

    #[test]
    fn test_from_parts() {
        let cred = Credential::from_parts("id", "sk", "2030-01-01T00:00:00.5").unwrap();
        assert_eq!(cred.access_key_id, "id");
        assert_eq!(cred.secret_access_key, "sk");
        assert!(cred.is_usable(Utc::now().naive_utc()));
    }
}
