/// Yes/no gate consulted before destructive or costly operations. Kept
/// synchronous so interactive frontends can block on their own input
/// handling.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Gate that approves everything, for scripted use and for tests that are
/// not about confirmation.
pub struct AutoConfirm;

impl ConfirmationGate for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
