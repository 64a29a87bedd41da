use async_trait::async_trait;
use serde_json::Value;

use scenario_types::{ApiResponse, InputFile, Method, ScenarioError};

/// The contract a scenario's `eval` effects are built on: execute one typed
/// method call against the external API and get back its typed response or
/// a [`ScenarioError`].
///
/// `execute` is generic over `Req`, so this trait is not object-safe. The
/// runtime is generic over `C: RpcClient` rather than holding a `dyn
/// RpcClient` — acceptable since a process only ever talks to one external
/// API account per `Bot`.
#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn execute<Req: Method>(&self, req: Req) -> Result<Req::Response, ScenarioError>;
}

/// A live [`RpcClient`] backed by `reqwest`, talking to a Telegram-Bot-API-
/// shaped HTTP endpoint: `POST {base_url}/bot{token}/{method}`.
pub struct HttpRpcClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRpcClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into(), token: token.into() }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn execute<Req: Method>(&self, req: Req) -> Result<Req::Response, ScenarioError> {
        let name = req.name();
        let url = self.endpoint(name);

        let fields = serde_json::to_value(&req)
            .map_err(|source| ScenarioError::Decode { method: name, source })?;
        let uploads = req.uploads();

        let response = if uploads.is_empty() {
            self.http.post(&url).json(&fields).send().await
        } else {
            let mut form = reqwest::multipart::Form::new();
            if let Value::Object(map) = fields {
                for (key, value) in map {
                    let text = match value {
                        Value::String(s) => s,
                        Value::Null => continue,
                        other => other.to_string(),
                    };
                    form = form.text(key, text);
                }
            }
            for (field, file) in uploads {
                form = match file {
                    InputFile::Existing(id) => form.text(field, id),
                    InputFile::Upload { filename, bytes } => {
                        let body = reqwest::Body::wrap_stream(bytes);
                        let part = reqwest::multipart::Part::stream(body).file_name(filename);
                        form.part(field, part)
                    }
                };
            }
            self.http.post(&url).multipart(form).send().await
        };

        let response = response
            .map_err(|e| ScenarioError::Transport { method: name, source: e.into() })?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScenarioError::Transport { method: name, source: e.into() })?;
        let decoded: ApiResponse<Req::Response> = serde_json::from_slice(&bytes)
            .map_err(|source| ScenarioError::Decode { method: name, source })?;

        if !decoded.ok {
            return Err(ScenarioError::Method {
                method: name,
                code: decoded.error_code,
                description: decoded.description.unwrap_or_default(),
            });
        }
        decoded.result.ok_or(ScenarioError::Method {
            method: name,
            code: None,
            description: "response marked ok but carried no result".to_string(),
        })
    }
}
