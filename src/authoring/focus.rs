//! Which input receives variable insertions.

use std::fmt;

/// One of the two editable fields of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureField {
    Title,
    Text,
}

/// Identity of an open condition editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionHandle(pub(crate) u64);

impl fmt::Display for ConditionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition-editor-{}", self.0)
    }
}

/// The current insertion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Document,
    SignatureField { index: usize, field: SignatureField },
    ConditionInput { handle: ConditionHandle },
}

/// Tracks the last focused document or signature target and the condition
/// editor, if any, holding insertion priority.
///
/// A claim outranks the target until it is released. Nothing re-claims on
/// its own: a released editor must be claimed again explicitly.
#[derive(Debug, Clone)]
pub struct FocusRegistry {
    target: Focus,
    claim: Option<ConditionHandle>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self {
            target: Focus::Document,
            claim: None,
        }
    }

    pub fn current(&self) -> Focus {
        match self.claim {
            Some(handle) => Focus::ConditionInput { handle },
            None => self.target,
        }
    }

    /// The focus insertions fall back to once no editor holds a claim.
    pub fn target(&self) -> Focus {
        self.target
    }

    pub fn claimed_by(&self) -> Option<ConditionHandle> {
        self.claim
    }

    /// Focus a document or signature target, releasing any claim.
    ///
    /// Returns the handle whose claim was released.
    pub fn focus_target(&mut self, target: Focus) -> Option<ConditionHandle> {
        if matches!(target, Focus::ConditionInput { .. }) {
            return None;
        }
        self.target = target;
        self.claim.take()
    }

    /// Give `handle` insertion priority, returning the previous holder.
    pub fn claim(&mut self, handle: ConditionHandle) -> Option<ConditionHandle> {
        self.claim.replace(handle).filter(|previous| *previous != handle)
    }

    /// Drop the claim if `handle` holds it.
    pub fn release(&mut self, handle: ConditionHandle) -> bool {
        if self.claim == Some(handle) {
            self.claim = None;
            true
        } else {
            false
        }
    }
}

impl Default for FocusRegistry {
    fn default() -> Self {
        Self::new()
    }
}
