use std::pin::Pin;

use futures::Stream;
use serde::{de::DeserializeOwned, Serialize};

/// A chunked byte source for an uploaded file. Implementations must not
/// require the whole file in memory at once.
pub type ByteSource = Pin<Box<dyn Stream<Item = std::io::Result<Vec<u8>>> + Send>>;

/// A file attached to a method call: either a reference to a file already
/// known to the external API, or new bytes to upload.
pub enum InputFile {
    Existing(String),
    Upload { filename: String, bytes: ByteSource },
}

impl std::fmt::Debug for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFile::Existing(id) => f.debug_tuple("Existing").field(id).finish(),
            InputFile::Upload { filename, .. } => {
                f.debug_struct("Upload").field("filename", filename).finish()
            }
        }
    }
}

/// A typed description of one RPC endpoint against the external API.
/// `name` is the HTTP endpoint suffix; the request
/// itself is the encoder (via `Serialize`); `Response` is the decoder
/// target. `uploads` lists any file fields that must be sent as multipart
/// parts rather than plain JSON scalars.
pub trait Method: Serialize + Send + Sync {
    type Response: DeserializeOwned + Send;

    fn name(&self) -> &'static str;

    /// Fields that must be uploaded as multipart parts. Empty by default —
    /// most methods carry no files.
    fn uploads(self) -> Vec<(&'static str, InputFile)>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// The response envelope every call against the external API returns.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}
