//! `AccountGateway` implementation backed by the PDS XRPC client
//!
//! Translates the engine's gateway operations into XRPC calls and maps
//! service failures onto the engine's error categories.

use crate::client::PdsClient;
use crate::error::PdsError;
use async_trait::async_trait;
use crewflow_engine::{AccountGateway, AccountInfo, GatewayError, GatewayResult, NewAccount, ProfileDocument};

/// PDS-backed account gateway
pub struct PdsGateway {
    client: PdsClient,

    /// Substitute bearer token for account creation requests
    creation_token: Option<String>,
}

impl PdsGateway {
    pub fn new(client: PdsClient) -> Self {
        Self {
            client,
            creation_token: None,
        }
    }

    /// Use a dedicated token for the creation request sequence
    ///
    /// Some deployments require a service-auth token to create accounts.
    /// The token is scoped to a derived client so the shared session is
    /// never touched.
    pub fn with_creation_token(mut self, token: impl Into<String>) -> Self {
        self.creation_token = Some(token.into());
        self
    }

    pub fn client(&self) -> &PdsClient {
        &self.client
    }

    fn creation_client(&self) -> PdsClient {
        match &self.creation_token {
            Some(token) => self.client.with_bearer(token),
            None => self.client.clone(),
        }
    }
}

fn into_gateway_error(err: PdsError) -> GatewayError {
    match err {
        PdsError::Api {
            ref error,
            ref message,
            status,
            ..
        } => {
            if error == "InvalidSwap" {
                GatewayError::VersionConflict(message.clone())
            } else if status == 404 || error.contains("NotFound") {
                GatewayError::NotFound(message.clone())
            } else if error.is_empty() {
                GatewayError::Rejected(message.clone())
            } else {
                GatewayError::Rejected(format!("{error}: {message}"))
            }
        }
        PdsError::Http(e) => GatewayError::Transport(e.to_string()),
        other => GatewayError::Rejected(other.to_string()),
    }
}

#[async_trait]
impl AccountGateway for PdsGateway {
    fn name(&self) -> &str {
        "pds"
    }

    async fn issue_invite_token(&self, max_uses: u32) -> GatewayResult<String> {
        tracing::debug!("Issuing invite code on {}", self.client.service());
        self.client
            .create_invite_code(max_uses)
            .await
            .map_err(into_gateway_error)
    }

    async fn create_account(&self, account: &NewAccount) -> GatewayResult<String> {
        tracing::info!("Creating account {} on {}", account.handle, self.client.service());
        self.creation_client()
            .create_account(
                &account.handle,
                &account.email,
                &account.password,
                &account.invite_token,
            )
            .await
            .map_err(into_gateway_error)
    }

    async fn get_account_info(&self, did: &str) -> GatewayResult<AccountInfo> {
        let (handle, email) = self
            .client
            .get_account_info(did)
            .await
            .map_err(into_gateway_error)?;
        Ok(AccountInfo { handle, email })
    }

    async fn update_email(&self, did: &str, email: &str) -> GatewayResult<()> {
        self.client
            .update_email(did, email)
            .await
            .map_err(into_gateway_error)
    }

    async fn update_handle(&self, did: &str, handle: &str) -> GatewayResult<()> {
        self.client
            .update_handle(did, handle)
            .await
            .map_err(into_gateway_error)
    }

    async fn update_password(&self, did: &str, password: &str) -> GatewayResult<()> {
        self.client
            .update_password(did, password)
            .await
            .map_err(into_gateway_error)
    }

    async fn delete_account(&self, did: &str) -> GatewayResult<()> {
        tracing::info!("Deleting account {} on {}", did, self.client.service());
        self.client
            .delete_account(did)
            .await
            .map_err(into_gateway_error)
    }

    async fn get_profile_document(&self, did: &str) -> GatewayResult<Option<ProfileDocument>> {
        match self.client.get_profile(did).await {
            Ok(profile) => Ok(Some(ProfileDocument {
                display_name: profile.display_name,
                version: profile.cid,
            })),
            Err(e) if e.is_record_not_found() => {
                tracing::debug!("No profile record for {}, treating as absent", did);
                Ok(None)
            }
            Err(e) => Err(into_gateway_error(e)),
        }
    }

    async fn put_profile_document(
        &self,
        did: &str,
        document: &ProfileDocument,
        expected_version: Option<&str>,
    ) -> GatewayResult<()> {
        self.client
            .put_profile(did, document.display_name.as_deref(), expected_version)
            .await
            .map_err(into_gateway_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, error: &str, message: &str) -> PdsError {
        PdsError::Api {
            nsid: "com.atproto.repo.putRecord".to_string(),
            status,
            error: error.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_invalid_swap_maps_to_version_conflict() {
        let mapped = into_gateway_error(api_error(400, "InvalidSwap", "cid mismatch"));
        assert!(matches!(mapped, GatewayError::VersionConflict(m) if m == "cid mismatch"));
    }

    #[test]
    fn test_not_found_maps_by_status_and_by_name() {
        let by_status = into_gateway_error(api_error(404, "", "no such endpoint"));
        assert!(matches!(by_status, GatewayError::NotFound(_)));

        let by_name = into_gateway_error(api_error(400, "RepoNotFound", "unknown repo"));
        assert!(matches!(by_name, GatewayError::NotFound(_)));
    }

    #[test]
    fn test_other_api_errors_are_rejections() {
        let mapped = into_gateway_error(api_error(400, "InvalidHandle", "handle taken"));
        assert!(matches!(
            mapped,
            GatewayError::Rejected(m) if m == "InvalidHandle: handle taken"
        ));
    }
}
