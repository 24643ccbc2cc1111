//! Request context carrying the scope and the resolved actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trove_core::error::AppError;
use trove_core::result::AppResult;
use trove_core::types::{ActorId, ScopeId};

/// Context for one inbound operation.
///
/// Authentication happens outside Trove; by the time a context exists the
/// actor, if any, is already resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The scope (project) being acted on.
    pub scope_id: ScopeId,
    /// The resolved actor, absent for anonymous reads.
    pub actor_id: Option<ActorId>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an anonymous read.
    pub fn anonymous(scope_id: ScopeId) -> Self {
        Self {
            scope_id,
            actor_id: None,
            request_time: Utc::now(),
        }
    }

    /// Context for an authenticated actor.
    pub fn for_actor(scope_id: ScopeId, actor_id: ActorId) -> Self {
        Self {
            scope_id,
            actor_id: Some(actor_id),
            request_time: Utc::now(),
        }
    }

    /// The actor, required by every mutating operation.
    pub fn require_actor(&self) -> AppResult<ActorId> {
        self.actor_id
            .ok_or_else(|| AppError::bad_request("A resolved actor is required"))
    }
}
