//! Initial credential generation
//!
//! When no password is supplied for a new account the engine materializes
//! one from the OS entropy source. The service never returns a password on
//! read, so a generated value is surfaced to the caller exactly once, at
//! creation, and is not tracked afterwards.

use crate::error::{EngineError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use rand::RngCore;
use rand::rngs::OsRng;

/// Length of a generated initial password, in characters
pub const GENERATED_PASSWORD_LEN: usize = 30;

/// An initial account credential with its provenance
///
/// Provenance decides two things at creation time: only a `Supplied` value
/// is recorded in the local state placeholder, and only a `Generated` value
/// is surfaced back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Supplied by the caller; tracked locally, never surfaced back
    Supplied(String),

    /// Generated by the engine; surfaced once, never tracked
    Generated(String),
}

impl Credential {
    pub fn value(&self) -> &str {
        match self {
            Credential::Supplied(value) | Credential::Generated(value) => value,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Credential::Generated(_))
    }
}

/// Generate a URL-safe random password of [`GENERATED_PASSWORD_LEN`] characters
///
/// Fails with [`EngineError::RandomnessUnavailable`] when the OS entropy
/// source cannot be read; that is terminal for the cycle, no retry.
pub fn generate_password() -> Result<String> {
    let mut buf = [0u8; GENERATED_PASSWORD_LEN];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| EngineError::RandomnessUnavailable(e.to_string()))?;

    // 30 bytes encode to 40 characters; keep exactly the target length
    let mut encoded = URL_SAFE.encode(buf);
    encoded.truncate(GENERATED_PASSWORD_LEN);
    Ok(encoded)
}

/// Resolve the creation credential from the desired configuration
///
/// An absent or empty desired password means "generate one".
pub fn materialize(supplied: Option<&str>) -> Result<Credential> {
    match supplied {
        Some(password) if !password.is_empty() => Ok(Credential::Supplied(password.to_string())),
        _ => Ok(Credential::Generated(generate_password()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_length_and_alphabet() {
        let password = generate_password().unwrap();
        assert_eq!(password.len(), GENERATED_PASSWORD_LEN);
        assert!(
            password
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "unexpected character in {password}"
        );
    }

    #[test]
    fn test_generated_passwords_differ() {
        let a = generate_password().unwrap();
        let b = generate_password().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_materialize_provenance() {
        let supplied = materialize(Some("s3cret")).unwrap();
        assert_eq!(supplied, Credential::Supplied("s3cret".to_string()));
        assert!(!supplied.is_generated());

        let generated = materialize(None).unwrap();
        assert!(generated.is_generated());
        assert_eq!(generated.value().len(), GENERATED_PASSWORD_LEN);

        // An empty supplied password also means "generate"
        assert!(materialize(Some("")).unwrap().is_generated());
    }
}
