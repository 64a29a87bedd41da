use thiserror::Error;

/// The failure taxonomy for this crate. A source running out of updates is
/// deliberately absent as a variant — that is a clean termination, not an
/// error, so it is represented structurally (the update stream simply
/// ending) rather than here.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("transport error calling {method}: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to decode response for {method}: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("method {method} failed (code {code:?}): {description}")]
    Method {
        method: &'static str,
        code: Option<i64>,
        description: String,
    },

    /// A user-raised error, from `eval` propagating a client failure or
    /// from an explicit `raise`.
    #[error("{0}")]
    Raised(anyhow::Error),
}

impl ScenarioError {
    pub fn raised<E>(err: E) -> Self
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        ScenarioError::Raised(anyhow::anyhow!("{err}"))
    }
}
