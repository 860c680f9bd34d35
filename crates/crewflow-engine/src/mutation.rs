//! Mutation types for account reconciliation
//!
//! A reconciliation cycle is expressed as an ordered list of field-level
//! mutations plus an outcome record of what was actually applied. The list
//! is built by the diff module and consumed by the reconciler; the outcome
//! record is what the state committer trusts.

/// Account fields mutated through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Handle,
    Password,
    DisplayName,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Email => write!(f, "email"),
            Field::Handle => write!(f, "handle"),
            Field::Password => write!(f, "password"),
            Field::DisplayName => write!(f, "display name"),
        }
    }
}

/// A single planned mutation
///
/// `ClearPasswordTracking` is the one step that never reaches the gateway:
/// it only drops the locally recorded password placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetEmail(String),
    SetHandle(String),
    SetPassword(String),
    ClearPasswordTracking,
    SetDisplayName(Option<String>),
}

impl Mutation {
    pub fn field(&self) -> Field {
        match self {
            Mutation::SetEmail(_) => Field::Email,
            Mutation::SetHandle(_) => Field::Handle,
            Mutation::SetPassword(_) | Mutation::ClearPasswordTracking => Field::Password,
            Mutation::SetDisplayName(_) => Field::DisplayName,
        }
    }
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets never appear in rendered mutations
        match self {
            Mutation::SetEmail(email) => write!(f, "update email to {}", email),
            Mutation::SetHandle(handle) => write!(f, "update handle to {}", handle),
            Mutation::SetPassword(_) => write!(f, "update password"),
            Mutation::ClearPasswordTracking => write!(f, "stop tracking password"),
            Mutation::SetDisplayName(Some(name)) => write!(f, "update display name to {}", name),
            Mutation::SetDisplayName(None) => write!(f, "clear display name"),
        }
    }
}

/// A desired change suppressed by the update policy
///
/// Blocked changes are reported as errors without a remote call; the field
/// keeps its prior state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedChange {
    pub field: Field,
    pub reason: String,
}

impl BlockedChange {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for BlockedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Ordered mutations for one reconciliation cycle
#[derive(Debug, Clone, Default)]
pub struct MutationPlan {
    /// Steps applied strictly in this order
    pub steps: Vec<Mutation>,

    /// Changes suppressed by policy
    pub blocked: Vec<BlockedChange>,
}

impl MutationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_changes(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.blocked.is_empty()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            updates: self.steps.len(),
            blocked: self.blocked.len(),
        }
    }
}

/// Summary of planned mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub updates: usize,
    pub blocked: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to update, {} blocked by policy",
            self.updates, self.blocked
        )
    }
}

/// Outcome of a single applied or failed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub mutation: Mutation,

    /// Error message when the step failed
    pub error: Option<String>,
}

impl std::fmt::Display for StepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            Some(error) => write!(f, "{}: {}", self.mutation.field(), error),
            None => write!(f, "{}", self.mutation),
        }
    }
}

/// Result of applying a mutation plan
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Steps that demonstrably succeeded
    pub applied: Vec<StepReport>,

    /// Steps that failed; later steps still ran
    pub failed: Vec<StepReport>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyReport {
    pub fn new() -> Self {
        Self {
            applied: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_applied(&mut self, mutation: Mutation) {
        self.applied.push(StepReport {
            mutation,
            error: None,
        });
    }

    pub fn add_failed(&mut self, mutation: Mutation, error: String) {
        self.failed.push(StepReport {
            mutation,
            error: Some(error),
        });
    }
}

impl Default for ApplyReport {
    fn default() -> Self {
        Self::new()
    }
}
