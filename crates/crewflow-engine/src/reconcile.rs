//! Account reconciliation cycles
//!
//! One `Reconciler` call is one cycle: gate, diff, ordered application of
//! mutations, commit of whatever demonstrably succeeded. The remote API is
//! not transactional - every field is its own call - so the cycle keeps
//! going past per-field failures and reports them all together at the end.
//! Host cancellation is honored between steps, never mid-step: a started
//! remote call runs to an outcome before the next is considered.

use crate::diff;
use crate::error::{GatewayResult, Result};
use crate::gate::{self, OpClass};
use crate::gateway::{AccountGateway, NewAccount, ProfileDocument};
use crate::mutation::{ApplyReport, Mutation, MutationPlan};
use crate::secret::{self, Credential};
use crate::spec::{AccountSpec, UpdatePolicy};
use crate::state::AccountState;
use std::time::Instant;

/// Invite tokens are always single-use
const INVITE_MAX_USES: u32 = 1;

/// Outcome of one reconciliation cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// New observed state; `None` after deletion
    pub state: Option<AccountState>,

    pub status: CycleStatus,

    /// One-time caller-facing notices (e.g. a generated credential)
    pub notices: Vec<String>,

    /// Field-level and step errors accumulated over the cycle
    pub errors: Vec<String>,
}

impl CycleReport {
    fn converged(state: Option<AccountState>) -> Self {
        Self {
            state,
            status: CycleStatus::Converged,
            notices: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Remote state matches the desired configuration
    Converged,
    /// The primary resource exists but some steps failed
    Degraded,
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleStatus::Converged => write!(f, "converged"),
            CycleStatus::Degraded => write!(f, "degraded"),
        }
    }
}

/// Pre-flight validation outcome
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Merge demonstrably-succeeded outcomes into a new observed state
///
/// Failed and skipped steps keep their prior value; progress is monotonic
/// and success is never fabricated.
pub fn commit(prior: &AccountState, report: &ApplyReport) -> AccountState {
    let mut state = prior.clone();
    for step in &report.applied {
        match &step.mutation {
            Mutation::SetEmail(email) => state.email = email.clone(),
            Mutation::SetHandle(handle) => state.handle = handle.clone(),
            Mutation::SetPassword(password) => state.password = Some(password.clone()),
            Mutation::ClearPasswordTracking => state.password = None,
            Mutation::SetDisplayName(name) => state.display_name = name.clone(),
        }
    }
    if !report.applied.is_empty() {
        state.touch();
    }
    state
}

/// Drives create/read/update/delete cycles against a gateway
///
/// The gateway session is shared read-only across a cycle; the reconciler
/// itself performs no locking (the host serializes cycles per account).
pub struct Reconciler<G: AccountGateway> {
    gateway: G,
    policy: UpdatePolicy,
    session_token: Option<String>,
}

impl<G: AccountGateway> Reconciler<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            policy: UpdatePolicy::default(),
            session_token: None,
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Session access token inspected by the capability gate
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn policy(&self) -> &UpdatePolicy {
        &self.policy
    }

    /// Compute the mutation plan for an existing account, without applying it
    pub fn plan(&self, spec: &AccountSpec, state: &AccountState) -> MutationPlan {
        diff::plan_update(spec, state, &self.policy)
    }

    fn gate(&self, op: OpClass) -> Result<()> {
        if let Some(token) = &self.session_token {
            gate::ensure_privilege(token, op)?;
        }
        Ok(())
    }

    /// Create the remote account
    ///
    /// Fatal on gate, entropy, invite, or create-call failure: there is no
    /// half-created resource to reconcile. A failed profile step after a
    /// successful create keeps the account and degrades the result instead.
    pub async fn create(&self, spec: &AccountSpec) -> Result<CycleReport> {
        self.gate(OpClass::Create)?;

        let credential = secret::materialize(spec.password.as_deref())?;

        let invite = self.gateway.issue_invite_token(INVITE_MAX_USES).await?;
        tracing::debug!("Issued single-use invite token via {}", self.gateway.name());

        // Exactly one create call per cycle; it is not idempotent
        let account = NewAccount {
            handle: spec.handle.clone(),
            email: spec.email.clone(),
            password: credential.value().to_string(),
            invite_token: invite,
        };
        let did = self.gateway.create_account(&account).await?;
        tracing::info!("Created account {} as {}", spec.handle, did);

        let mut state = AccountState::new(did, spec.handle.clone(), spec.email.clone());
        let mut report = CycleReport::converged(None);

        match &credential {
            // Only a caller-supplied password is tracked locally
            Credential::Supplied(password) => state.password = Some(password.clone()),
            // A generated one is surfaced once and forgotten
            Credential::Generated(password) => report.notices.push(format!(
                "generated initial password for {} (shown once, not retrievable later): {}",
                spec.handle, password
            )),
        }

        if let Some(name) = &spec.display_name {
            match self.write_display_name(&state.did, Some(name)).await {
                Ok(()) => state.display_name = Some(name.clone()),
                Err(e) => {
                    tracing::warn!("Profile update failed after creating {}: {}", spec.handle, e);
                    report.status = CycleStatus::Degraded;
                    report.errors.push(format!("display name: {e}"));
                }
            }
        }

        report.state = Some(state);
        Ok(report)
    }

    /// Refresh the observed state from the service
    ///
    /// Read-only; a failure (including `NotFound` for a vanished account) is
    /// terminal for the cycle. The password placeholder is carried through
    /// unchanged - the service never reports it.
    pub async fn read(&self, state: &AccountState) -> Result<CycleReport> {
        let info = self.gateway.get_account_info(&state.did).await?;
        let profile = self.gateway.get_profile_document(&state.did).await?;

        let mut refreshed = state.clone();
        refreshed.handle = info.handle;
        refreshed.email = info.email;
        refreshed.display_name = profile.and_then(|p| p.display_name);
        refreshed.touch();

        Ok(CycleReport::converged(Some(refreshed)))
    }

    /// Align the remote account with the desired configuration
    ///
    /// Mutations run strictly in diff order and failures do not stop the
    /// remaining fields; every error of the cycle is reported together.
    /// The result never regresses to an absent account.
    pub async fn update(&self, spec: &AccountSpec, state: &AccountState) -> Result<CycleReport> {
        let plan = diff::plan_update(spec, state, &self.policy);
        if plan.is_empty() {
            tracing::debug!("Account {} already converged", state.handle);
            return Ok(CycleReport::converged(Some(state.clone())));
        }

        let applied = self.apply_steps(&state.did, &plan.steps).await;
        let new_state = commit(state, &applied);

        let mut errors: Vec<String> = plan.blocked.iter().map(|b| b.to_string()).collect();
        errors.extend(applied.failed.iter().map(|s| s.to_string()));

        let status = if errors.is_empty() {
            CycleStatus::Converged
        } else {
            CycleStatus::Degraded
        };

        tracing::info!(
            "Updated {}: {} applied, {} failed, {} blocked in {}ms",
            state.handle,
            applied.applied.len(),
            applied.failed.len(),
            plan.blocked.len(),
            applied.duration_ms
        );

        Ok(CycleReport {
            state: Some(new_state),
            status,
            notices: Vec::new(),
            errors,
        })
    }

    /// Delete the remote account
    ///
    /// On failure the account must be assumed still present; the caller
    /// keeps its state and retries.
    pub async fn delete(&self, state: &AccountState) -> Result<CycleReport> {
        self.gate(OpClass::Delete)?;

        self.gateway.delete_account(&state.did).await?;
        tracing::info!("Deleted account {} ({})", state.handle, state.did);

        Ok(CycleReport::converged(None))
    }

    /// Pre-flight check: capability gate plus plan-time warnings
    ///
    /// Makes no remote calls. Consulted before create and delete; for other
    /// operation classes the token is not inspected.
    pub fn validate(&self, spec: &AccountSpec, op: OpClass) -> ValidationReport {
        let mut report = ValidationReport::default();

        if let Some(token) = &self.session_token
            && let Err(e) = gate::ensure_privilege(token, op)
        {
            report.errors.push(e.to_string());
        }

        if op == OpClass::Create && !spec.has_password() {
            report.warnings.push(format!(
                "no password configured for {}; an initial password will be generated and shown once",
                spec.handle
            ));
        }

        report
    }

    /// Apply mutations strictly in order, recording each outcome
    async fn apply_steps(&self, did: &str, steps: &[Mutation]) -> ApplyReport {
        let started = Instant::now();
        let mut report = ApplyReport::new();

        for step in steps {
            let result = match step {
                Mutation::SetEmail(email) => self.gateway.update_email(did, email).await,
                Mutation::SetHandle(handle) => self.gateway.update_handle(did, handle).await,
                Mutation::SetPassword(password) => {
                    self.gateway.update_password(did, password).await
                }
                // Local bookkeeping only
                Mutation::ClearPasswordTracking => Ok(()),
                Mutation::SetDisplayName(name) => {
                    self.write_display_name(did, name.as_deref()).await
                }
            };

            match result {
                Ok(()) => {
                    tracing::debug!("Applied: {}", step);
                    report.add_applied(step.clone());
                }
                Err(e) => {
                    tracing::warn!("Failed: {} ({}); continuing with remaining fields", step, e);
                    report.add_failed(step.clone(), e.to_string());
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    /// Read-modify-write of the profile document under its observed version
    async fn write_display_name(&self, did: &str, name: Option<&str>) -> GatewayResult<()> {
        let current = self.gateway.get_profile_document(did).await?;
        let expected = current.as_ref().and_then(|p| p.version.clone());

        let document = ProfileDocument {
            display_name: name.map(|n| n.to_string()),
            version: None,
        };
        self.gateway
            .put_profile_document(did, &document, expected.as_deref())
            .await
    }
}
