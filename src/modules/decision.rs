//! # Unload eligibility decisions.
//!
//! [`UnloadDecision`] is the answer a participant gives during unload
//! negotiation: approval, or rejection with one or more human-readable
//! reasons. The negotiation merges the decisions of every participant (all
//! descendants plus self) into one aggregate — approval is the logical AND,
//! rejection reasons are concatenated in polling order, and no participant's
//! approval ever suppresses another's rejection.
//!
//! # Example
//! ```
//! use modvisor::UnloadDecision;
//!
//! let mut agg = UnloadDecision::approve();
//! agg.merge(UnloadDecision::reject("busy"));
//! agg.merge(UnloadDecision::approve());
//! agg.merge(UnloadDecision::reject("unsaved changes"));
//!
//! assert!(!agg.is_approved());
//! assert_eq!(agg.reasons(), ["busy", "unsaved changes"]);
//! ```

/// Outcome of polling one participant (or an aggregate of many) for unload
/// eligibility.
#[derive(Debug, Clone)]
pub struct UnloadDecision {
    approved: bool,
    reasons: Vec<String>,
}

impl UnloadDecision {
    /// The participant is ready to terminate.
    pub fn approve() -> Self {
        Self {
            approved: true,
            reasons: Vec::new(),
        }
    }

    /// The participant refuses to terminate, with a reason.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reasons: vec![reason.into()],
        }
    }

    /// Returns `true` when every merged participant approved.
    pub fn is_approved(&self) -> bool {
        self.approved
    }

    /// Rejection messages collected so far, in polling order.
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Folds another participant's decision into this one.
    ///
    /// Approval is the logical AND; rejection reasons accumulate in merge
    /// order.
    pub fn merge(&mut self, other: UnloadDecision) {
        self.approved &= other.approved;
        self.reasons.extend(other.reasons);
    }

    /// Consumes the decision, returning the merged rejection messages.
    pub fn into_reasons(self) -> Vec<String> {
        self.reasons
    }
}

impl Default for UnloadDecision {
    /// Defaults to approval: a participant that has no opinion never blocks
    /// termination.
    fn default() -> Self {
        Self::approve()
    }
}
