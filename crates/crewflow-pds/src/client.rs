//! ATProto PDS XRPC client
//!
//! Direct XRPC implementation for the account endpoints crewflow needs.
//! Admin endpoints authenticate with HTTP Basic (`admin` / admin token);
//! repository and server endpoints carry the session bearer token when one
//! is configured. Queries are GET, procedures are POST with a JSON body,
//! and error responses carry `{ "error", "message" }`.

use crate::error::{PdsError, Result};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Collection holding the actor profile record
const PROFILE_COLLECTION: &str = "app.bsky.actor.profile";
const PROFILE_RKEY: &str = "self";

/// Default environment variable for the admin token
pub const DEFAULT_ADMIN_TOKEN_ENV: &str = "CREW_PDS_ADMIN_TOKEN";

/// Default environment variable for the session access token
pub const DEFAULT_SESSION_TOKEN_ENV: &str = "CREW_PDS_SESSION_TOKEN";

/// Configuration for the PDS client
#[derive(Debug, Clone)]
pub struct PdsConfig {
    /// Base URL of the PDS (e.g. `https://pds.example.com`)
    pub service: String,

    /// Admin token; required for every account mutation
    pub admin_token: String,

    /// Session access token; optional, used as bearer where applicable
    pub session_token: Option<String>,
}

impl PdsConfig {
    pub fn new(service: impl Into<String>, admin_token: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            admin_token: admin_token.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Build a config by reading tokens from the named environment variables
    ///
    /// The admin token is required; the session token is optional.
    pub fn from_env(
        service: impl Into<String>,
        admin_token_env: &str,
        session_token_env: &str,
    ) -> Result<Self> {
        let admin_token = std::env::var(admin_token_env)
            .map_err(|_| PdsError::MissingEnvVar(admin_token_env.to_string()))?;

        Ok(Self {
            service: service.into(),
            admin_token,
            session_token: std::env::var(session_token_env).ok(),
        })
    }
}

/// Minimal XRPC client for PDS account management
#[derive(Clone)]
pub struct PdsClient {
    client: reqwest::Client,
    service: String,
    admin_token: String,
    bearer: Option<String>,
}

/// Profile record as stored on the PDS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileInfo {
    pub display_name: Option<String>,

    /// CID of the stored record; the swap key for subsequent writes
    pub cid: Option<String>,
}

impl PdsClient {
    pub fn new(config: PdsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            service: config.service.trim_end_matches('/').to_string(),
            admin_token: config.admin_token,
            bearer: config.session_token,
        }
    }

    /// Base URL of the PDS
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The configured session token, if any
    pub fn session_token(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    /// Derive a client that carries a different bearer token
    ///
    /// The original client is untouched; the copy shares the connection
    /// pool. Used to scope a substitute credential to a single request
    /// sequence instead of mutating shared session state.
    pub fn with_bearer(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            service: self.service.clone(),
            admin_token: self.admin_token.clone(),
            bearer: Some(token.into()),
        }
    }

    fn url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service, nsid)
    }

    /// Issue a single-use invite code
    pub async fn create_invite_code(&self, use_count: u32) -> Result<String> {
        let nsid = "com.atproto.server.createInviteCode";
        let response = self
            .client
            .post(self.url(nsid))
            .basic_auth("admin", Some(&self.admin_token))
            .json(&CreateInviteRequest { use_count })
            .send()
            .await?;

        let out: CreateInviteResponse = Self::decode(nsid, response).await?;
        Ok(out.code)
    }

    /// Create an account, returning its DID
    ///
    /// Carries the client's bearer token when one is set; creation on an
    /// invite-gated PDS works without one.
    pub async fn create_account(
        &self,
        handle: &str,
        email: &str,
        password: &str,
        invite_code: &str,
    ) -> Result<String> {
        let nsid = "com.atproto.server.createAccount";
        let mut request = self.client.post(self.url(nsid)).json(&CreateAccountRequest {
            handle: handle.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            invite_code: invite_code.to_string(),
        });
        if let Some(bearer) = &self.bearer {
            request = request.bearer_auth(bearer);
        }
        let response = request.send().await?;

        let out: CreateAccountResponse = Self::decode(nsid, response).await?;
        Ok(out.did)
    }

    /// Fetch identity fields for an account
    pub async fn get_account_info(&self, did: &str) -> Result<(String, String)> {
        let nsid = "com.atproto.admin.getAccountInfo";
        let response = self
            .client
            .get(self.url(nsid))
            .query(&[("did", did)])
            .basic_auth("admin", Some(&self.admin_token))
            .send()
            .await?;

        let out: AdminAccountView = Self::decode(nsid, response).await?;
        Ok((out.handle, out.email.unwrap_or_default()))
    }

    pub async fn update_email(&self, did: &str, email: &str) -> Result<()> {
        let nsid = "com.atproto.admin.updateAccountEmail";
        let response = self
            .client
            .post(self.url(nsid))
            .basic_auth("admin", Some(&self.admin_token))
            .json(&UpdateEmailRequest {
                account: did.to_string(),
                email: email.to_string(),
            })
            .send()
            .await?;

        Self::check_ok(nsid, response).await
    }

    pub async fn update_handle(&self, did: &str, handle: &str) -> Result<()> {
        let nsid = "com.atproto.admin.updateAccountHandle";
        let response = self
            .client
            .post(self.url(nsid))
            .basic_auth("admin", Some(&self.admin_token))
            .json(&UpdateHandleRequest {
                did: did.to_string(),
                handle: handle.to_string(),
            })
            .send()
            .await?;

        Self::check_ok(nsid, response).await
    }

    pub async fn update_password(&self, did: &str, password: &str) -> Result<()> {
        let nsid = "com.atproto.admin.updateAccountPassword";
        let response = self
            .client
            .post(self.url(nsid))
            .basic_auth("admin", Some(&self.admin_token))
            .json(&UpdatePasswordRequest {
                did: did.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        Self::check_ok(nsid, response).await
    }

    pub async fn delete_account(&self, did: &str) -> Result<()> {
        let nsid = "com.atproto.admin.deleteAccount";
        let response = self
            .client
            .post(self.url(nsid))
            .basic_auth("admin", Some(&self.admin_token))
            .json(&DeleteAccountRequest {
                did: did.to_string(),
            })
            .send()
            .await?;

        Self::check_ok(nsid, response).await
    }

    /// Read the actor profile record with its CID
    ///
    /// Fails with the service's `RecordNotFound` answer when the account has
    /// never written a profile; see [`PdsError::is_record_not_found`].
    pub async fn get_profile(&self, did: &str) -> Result<ProfileInfo> {
        let nsid = "com.atproto.repo.getRecord";
        let mut request = self.client.get(self.url(nsid)).query(&[
            ("repo", did),
            ("collection", PROFILE_COLLECTION),
            ("rkey", PROFILE_RKEY),
        ]);
        if let Some(bearer) = &self.bearer {
            request = request.bearer_auth(bearer);
        }
        let response = request.send().await?;

        let out: GetRecordResponse = Self::decode(nsid, response).await?;
        Ok(ProfileInfo {
            display_name: out.value.display_name,
            cid: out.cid,
        })
    }

    /// Write the actor profile record, swapping against the given CID
    ///
    /// `swap_cid: None` asserts the record does not exist yet.
    pub async fn put_profile(
        &self,
        did: &str,
        display_name: Option<&str>,
        swap_cid: Option<&str>,
    ) -> Result<()> {
        let nsid = "com.atproto.repo.putRecord";
        let body = PutRecordRequest {
            repo: did.to_string(),
            collection: PROFILE_COLLECTION.to_string(),
            rkey: PROFILE_RKEY.to_string(),
            record: ProfileRecord {
                record_type: PROFILE_COLLECTION.to_string(),
                display_name: display_name.map(|n| n.to_string()),
            },
            swap_record: swap_cid.map(|c| c.to_string()),
        };

        let mut request = self.client.post(self.url(nsid)).json(&body);
        if let Some(bearer) = &self.bearer {
            request = request.bearer_auth(bearer);
        }
        let response = request.send().await?;

        Self::check_ok(nsid, response).await
    }

    async fn decode<T: DeserializeOwned>(nsid: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        Err(Self::api_error(nsid, status.as_u16(), response).await)
    }

    async fn check_ok(nsid: &str, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::api_error(nsid, status.as_u16(), response).await)
    }

    async fn api_error(nsid: &str, status: u16, response: reqwest::Response) -> PdsError {
        let body = response.text().await.unwrap_or_default();
        let parsed: XrpcErrorBody = serde_json::from_str(&body).unwrap_or_default();

        let message = if parsed.message.is_empty() {
            body.chars().take(200).collect()
        } else {
            parsed.message
        };

        PdsError::Api {
            nsid: nsid.to_string(),
            status,
            error: parsed.error,
            message,
        }
    }
}

// ============ API Types ============

#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateInviteRequest {
    use_count: u32,
}

#[derive(Debug, Deserialize)]
struct CreateInviteResponse {
    code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest {
    handle: String,
    email: String,
    password: String,
    invite_code: String,
}

#[derive(Debug, Deserialize)]
struct CreateAccountResponse {
    did: String,
}

#[derive(Debug, Deserialize)]
struct AdminAccountView {
    handle: String,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateEmailRequest {
    account: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct UpdateHandleRequest {
    did: String,
    handle: String,
}

#[derive(Debug, Serialize)]
struct UpdatePasswordRequest {
    did: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct DeleteAccountRequest {
    did: String,
}

#[derive(Debug, Deserialize)]
struct GetRecordResponse {
    cid: Option<String>,
    value: ProfileRecord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    #[serde(rename = "$type")]
    record_type: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    display_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PutRecordRequest {
    repo: String,
    collection: String,
    rkey: String,
    record: ProfileRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    swap_record: Option<String>,
}
