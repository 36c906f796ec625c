//! # Unload negotiation: recursive eligibility polling.
//!
//! Before an unload proceeds, every participant — each active descendant and
//! the instance itself — is asked whether termination may go ahead. The
//! aggregate is the logical AND of every answer; rejection reasons are merged
//! into one ordered list (children in registration order, then self).
//!
//! ## Rules
//! - **No short-circuiting**: every participant is always polled, so all
//!   rejection reasons surface together in a single veto.
//! - Polling is read-only: no participant changes state during negotiation,
//!   so a veto leaves the whole tree exactly as it was.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

use crate::modules::UnloadDecision;

use super::ModuleHost;

impl ModuleHost {
    /// Polls self and every active descendant for unload eligibility.
    ///
    /// Public so hosts can pre-flight a veto without starting the unload
    /// transition. `unload()` runs the same negotiation internally.
    ///
    /// Boxed because the recursion through the child tree would otherwise
    /// make the future unsized.
    pub fn can_unload(self: &Arc<Self>) -> BoxFuture<'static, UnloadDecision> {
        let host = Arc::clone(self);
        async move {
            let children = host.children();
            let polled = join_all(children.iter().map(|child| child.can_unload())).await;
            let own = host.module.on_should_unload(&host).await;

            let mut decision = UnloadDecision::approve();
            for child_decision in polled {
                decision.merge(child_decision);
            }
            decision.merge(own);
            decision
        }
        .boxed()
    }
}
