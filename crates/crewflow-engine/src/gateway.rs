//! Remote account gateway abstraction

use crate::error::GatewayResult;
use async_trait::async_trait;

/// Payload for account creation
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub handle: String,
    pub email: String,
    pub password: String,
    pub invite_token: String,
}

/// Identity fields as reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub handle: String,
    pub email: String,
}

/// Profile document with its optimistic-concurrency version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDocument {
    pub display_name: Option<String>,

    /// Version tag of the stored record; `None` for a not-yet-written profile
    pub version: Option<String>,
}

/// Remote account service abstraction
///
/// Implementations drive the actual service API. Calls are independent and
/// independently failing: the engine, not the gateway, decides what a
/// failure means for the rest of the cycle. Implementations must not retry
/// internally; transient transport failures are terminal for the call.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// Gateway name for logs (e.g. "pds")
    fn name(&self) -> &str;

    /// Issue an invite token limited to `max_uses` account creations
    async fn issue_invite_token(&self, max_uses: u32) -> GatewayResult<String>;

    /// Create the account, returning the server-assigned identity key
    ///
    /// Not idempotent; the engine calls this at most once per cycle.
    async fn create_account(&self, account: &NewAccount) -> GatewayResult<String>;

    /// Fetch identity fields for an existing account
    async fn get_account_info(&self, did: &str) -> GatewayResult<AccountInfo>;

    async fn update_email(&self, did: &str, email: &str) -> GatewayResult<()>;

    async fn update_handle(&self, did: &str, handle: &str) -> GatewayResult<()>;

    async fn update_password(&self, did: &str, password: &str) -> GatewayResult<()>;

    async fn delete_account(&self, did: &str) -> GatewayResult<()>;

    /// Read the profile document; `Ok(None)` when none has been written yet
    async fn get_profile_document(&self, did: &str) -> GatewayResult<Option<ProfileDocument>>;

    /// Write the profile document, guarded by the previously observed version
    ///
    /// Fails with [`GatewayError::VersionConflict`] when the stored record no
    /// longer matches `expected_version`.
    ///
    /// [`GatewayError::VersionConflict`]: crate::error::GatewayError::VersionConflict
    async fn put_profile_document(
        &self,
        did: &str,
        document: &ProfileDocument,
        expected_version: Option<&str>,
    ) -> GatewayResult<()>;
}
