use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Credentials file not found at {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read credentials {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid credentials {path:?}: {message}")]
    Invalid { path: PathBuf, message: String },
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// A Google service-account key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        if !path.exists() {
            return Err(CredentialsError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| CredentialsError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let key = Self::from_json(&content).map_err(|message| CredentialsError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;

        info!(action = "load", component = "credentials", file_path = ?path, client_email = %key.client_email, "Loaded service account key");
        Ok(key)
    }

    fn from_json(content: &str) -> Result<Self, String> {
        let key: Self = serde_json::from_str(content).map_err(|e| e.to_string())?;
        if key.key_type != "service_account" {
            return Err(format!("expected type 'service_account', got '{}'", key.key_type));
        }
        if key.client_email.is_empty() {
            return Err("client_email is empty".to_string());
        }
        if !key.private_key.contains("PRIVATE KEY") {
            return Err("private_key is not a PEM key".to_string());
        }
        Ok(key)
    }
}
