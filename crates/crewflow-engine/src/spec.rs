//! Desired account configuration

/// Caller-declared target for a single account
///
/// Supplied anew on every reconciliation cycle and never modified by the
/// engine. The password field has three meanings: `None` leaves the
/// credential alone (or generates one at creation), `Some("")` stops
/// tracking a previously recorded password locally, any other value is the
/// credential the account should have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSpec {
    /// Unique human-readable identifier on the service
    pub handle: String,

    pub email: String,

    pub password: Option<String>,

    pub display_name: Option<String>,
}

impl AccountSpec {
    pub fn new(handle: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            email: email.into(),
            password: None,
            display_name: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Whether a usable (non-empty) password was supplied
    pub fn has_password(&self) -> bool {
        matches!(self.password.as_deref(), Some(p) if !p.is_empty())
    }
}

/// Which identity fields may still change after creation
///
/// The service itself allows both, but operators differ on whether handle
/// and email should be mutable under declarative control, so this is
/// configuration rather than fixed behavior. A change suppressed here is
/// reported as an error without any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePolicy {
    pub allow_handle_update: bool,
    pub allow_email_update: bool,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            allow_handle_update: true,
            allow_email_update: true,
        }
    }
}

impl UpdatePolicy {
    /// Policy that freezes handle and email after creation
    pub fn locked() -> Self {
        Self {
            allow_handle_update: false,
            allow_email_update: false,
        }
    }
}
