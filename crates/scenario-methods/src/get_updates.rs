use serde::Serialize;

use scenario_types::{Method, Update};

/// Long-poll for new updates. `offset` excludes everything up to and
/// including the previous highest `update_id` seen; `timeout` is the
/// server-side long-poll duration in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    pub limit: i32,
    pub timeout: i32,
}

impl Method for GetUpdates {
    type Response = Vec<Update>;

    fn name(&self) -> &'static str {
        "getUpdates"
    }
}
