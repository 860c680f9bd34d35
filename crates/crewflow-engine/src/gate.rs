//! Session capability gate
//!
//! Creating or deleting an account requires a full-privilege session, not
//! one opened with an app password. The gate decodes the session's access
//! token (a compact JWT) without verifying its signature and inspects the
//! scope claim. Authenticity is the session's own responsibility; this is a
//! capability check layered on an already-authenticated channel, not a
//! trust boundary. It runs before any mutation and is re-evaluated every
//! cycle, since the session capability can change between cycles.

use crate::error::{EngineError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Scope claim carried by a full-privilege session token
pub const SCOPE_FULL: &str = "com.atproto.access";

/// Scope claim carried by an app-password session token
pub const SCOPE_RESTRICTED: &str = "com.atproto.appPass";

/// Lifecycle operation class, as seen by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Create,
    Delete,
    /// Anything else; the gate never inspects the token for these
    Other,
}

impl OpClass {
    fn is_gated(self) -> bool {
        matches!(self, OpClass::Create | OpClass::Delete)
    }
}

/// Claims of interest inside a session access token
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    pub scope: Option<String>,

    /// Subject (the session's own identity key)
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decode the payload segment of a compact JWT without verifying it
pub fn decode_claims(token: &str) -> Result<SessionClaims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(EngineError::TokenMalformed(
            "expected three dot-separated segments".to_string(),
        ));
    };

    // Tolerate emitters that pad the segment
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| EngineError::TokenMalformed(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| EngineError::TokenMalformed(format!("payload is not a claims object: {e}")))
}

/// Gate a lifecycle operation on the session's scope claim
///
/// Create and delete fail with [`EngineError::PrivilegeInsufficient`] when
/// the scope claim marks a restricted session. A token without a scope
/// claim passes; a structurally broken token fails with
/// [`EngineError::TokenMalformed`]. Operations outside the gated classes
/// pass without the token being looked at.
pub fn ensure_privilege(token: &str, op: OpClass) -> Result<()> {
    if !op.is_gated() {
        return Ok(());
    }

    let claims = decode_claims(token)?;
    match claims.scope.as_deref() {
        Some(SCOPE_RESTRICTED) => Err(EngineError::PrivilegeInsufficient(
            SCOPE_RESTRICTED.to_string(),
        )),
        _ => Ok(()),
    }
}
