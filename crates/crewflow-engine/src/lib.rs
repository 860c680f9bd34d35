//! CrewFlow Reconciliation Engine
//!
//! This crate brings a remotely-hosted account into alignment with a
//! declared configuration, converging across repeated cycles even though
//! the remote API is not transactional: every field is mutated by its own
//! independently-failing call.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   crew CLI                       │
//! │              (crew plan/apply/rm)                │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               crewflow-engine                    │
//! │  gate ──▶ diff ──▶ apply ──▶ commit              │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait AccountGateway { ... }       │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │   secrets    │  │  state store │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────────────────┬─────────────────────────────┘
//!                     │
//!           ┌─────────▼─────────┐
//!           │    crewflow-pds    │
//!           │   (XRPC gateway)   │
//!           └───────────────────┘
//! ```
//!
//! A cycle with partial failures persists exactly the mutations that
//! demonstrably succeeded - no optimistic state, no rollback.

pub mod diff;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod mutation;
pub mod reconcile;
pub mod secret;
pub mod spec;
pub mod state;

// Re-exports
pub use error::{EngineError, GatewayError, GatewayResult, Result};
pub use gate::{OpClass, SCOPE_FULL, SCOPE_RESTRICTED, SessionClaims};
pub use gateway::{AccountGateway, AccountInfo, NewAccount, ProfileDocument};
pub use mutation::{
    ApplyReport, BlockedChange, Field, Mutation, MutationPlan, PlanSummary, StepReport,
};
pub use reconcile::{CycleReport, CycleStatus, Reconciler, ValidationReport, commit};
pub use secret::{Credential, GENERATED_PASSWORD_LEN};
pub use spec::{AccountSpec, UpdatePolicy};
pub use state::{AccountState, RosterState, StateLock, StateStore};
