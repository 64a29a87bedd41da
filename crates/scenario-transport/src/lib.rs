//! The external-API boundary: an [`RpcClient`] contract two concrete
//! transports implement, plus the two update sources the runtime drives
//! from.

mod client;
mod mock;
mod polling;
mod webhook;

pub use client::{HttpRpcClient, RpcClient};
pub use mock::MockRpcClient;
pub use polling::{poll_updates, PollingConfig};
pub use webhook::{webhook_source, with_webhook_route, WebhookState};
