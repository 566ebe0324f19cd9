//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dochub_core::types::UserId;

/// Context for the current request.
///
/// Authentication happens upstream; every service method receives the
/// already-identified user through this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: UserId,
    /// Correlation id for log lines belonging to this request.
    pub request_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `user_id` with a fresh request id.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            request_id: Uuid::new_v4(),
            request_time: Utc::now(),
        }
    }
}
