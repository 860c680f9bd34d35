//! ATProto PDS gateway for crewflow
//!
//! Drives account lifecycle operations on a Personal Data Server through
//! its XRPC admin and repository endpoints.
//!
//! # Requirements
//!
//! - A reachable PDS with admin access enabled
//! - Admin token (environment variable: `CREW_PDS_ADMIN_TOKEN` by default)
//! - Optionally a session access token for repository writes
//!   (`CREW_PDS_SESSION_TOKEN` by default)
//!
//! # Endpoints used
//!
//! - `com.atproto.server.createInviteCode` / `createAccount`
//! - `com.atproto.admin.getAccountInfo` / `updateAccountEmail` /
//!   `updateAccountHandle` / `updateAccountPassword` / `deleteAccount`
//! - `com.atproto.repo.getRecord` / `putRecord` (actor profile)

pub mod client;
pub mod error;
pub mod gateway;

pub use client::{
    DEFAULT_ADMIN_TOKEN_ENV, DEFAULT_SESSION_TOKEN_ENV, PdsClient, PdsConfig, ProfileInfo,
};
pub use error::{PdsError, Result};
pub use gateway::PdsGateway;
