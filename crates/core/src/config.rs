//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::media_type::TypePolicy;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Public base URL used to build `Location` headers.
    /// When unset, the request's scheme and `Host` header are used.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Maximum accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    crate::DEFAULT_MAX_BODY_BYTES
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_url: None,
            max_body_bytes: default_max_body_bytes(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_body_bytes == 0 {
            return Err("server.max_body_bytes must be greater than zero".to_string());
        }
        if let Some(url) = &self.api_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(format!(
                "server.api_url must start with http:// or https://, got {url:?}"
            ));
        }
        Ok(())
    }
}

/// Fragment data storage configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local storage. Contents are lost on restart.
    #[default]
    Memory,
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// AWS access key ID. Falls back to the default credential chain if not set.
        access_key_id: Option<String>,
        /// AWS secret access key. Falls back to the default credential chain if not set.
        secret_access_key: Option<String>,
        /// Force path-style URLs. Required for MinIO and some S3-compatible services.
        #[serde(default)]
        force_path_style: bool,
    },
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.trim().is_empty() {
                    return Err("s3 config requires a non-empty bucket".to_string());
                }
                match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                    (Some(_), Some(_)) | (None, None) => Ok(()),
                    _ => Err(
                        "s3 config requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    ),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// Process-local metadata. Contents are lost on restart.
    #[default]
    Memory,
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
}

impl MetadataConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { path } if path.as_os_str().is_empty() => {
                Err("sqlite config requires a non-empty path".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Accepted fragment types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypesConfig {
    /// Accept image fragments (png, jpeg, webp, gif).
    #[serde(default = "default_allow_images")]
    pub allow_images: bool,
}

fn default_allow_images() -> bool {
    true
}

impl Default for TypesConfig {
    fn default() -> Self {
        Self {
            allow_images: default_allow_images(),
        }
    }
}

impl TypesConfig {
    pub fn policy(&self) -> TypePolicy {
        TypePolicy::new(self.allow_images)
    }
}

/// A user allowed to authenticate with HTTP Basic credentials.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    /// Login email. The owner id is derived from it.
    pub email: String,
    /// SHA256 hex of the password (64 characters).
    /// Generate with: `echo -n "password" | sha256sum`
    pub password_hash: String,
}

/// Authentication configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        for user in &self.users {
            if user.email.trim().is_empty() {
                return Err("auth user email must not be empty".to_string());
            }
            if user.password_hash.len() != 64
                || !user.password_hash.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(format!(
                    "auth user {:?}: password_hash must be 64 hex characters",
                    user.email
                ));
            }
        }
        Ok(())
    }

    /// Users with well-known passwords.
    ///
    /// **For testing only.** `user1@email.com` / `password1` and
    /// `user2@email.com` / `password2`.
    pub fn for_testing() -> Self {
        Self {
            users: vec![
                UserConfig {
                    email: "user1@email.com".to_string(),
                    // SHA256 of "password1"
                    password_hash:
                        "0b14d501a594442a01c6859541bcb3e8164d183d32937b851835442f69d5c94e"
                            .to_string(),
                },
                UserConfig {
                    email: "user2@email.com".to_string(),
                    // SHA256 of "password2"
                    password_hash:
                        "6cf615d5bcaac778352a8f1f3360d23f02f34ec182e259897fd6ce485d7870d4"
                            .to_string(),
                },
            ],
        }
    }
}

/// Top-level service configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub types: TypesConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.metadata.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses in-memory stores and the test users.
    pub fn for_testing() -> Self {
        Self {
            auth: AuthConfig::for_testing(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.server.max_body_bytes, 5 * 1024 * 1024);
        assert!(config.server.metrics_enabled);
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert!(matches!(config.metadata, MetadataConfig::Memory));
        assert!(config.types.allow_images);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(config.auth.users.is_empty());
        assert!(config.server.api_url.is_none());
    }

    #[test]
    fn test_storage_config_tagged() {
        let json = r#"{"type":"filesystem","path":"/tmp/fragments"}"#;
        let config: StorageConfig = serde_json::from_str(json).unwrap();
        match config {
            StorageConfig::Filesystem { path } => assert_eq!(path, PathBuf::from("/tmp/fragments")),
            other => panic!("expected filesystem config, got {other:?}"),
        }
    }

    #[test]
    fn test_storage_config_s3_force_path_style_defaults_to_false() {
        let json = r#"{"type":"s3","bucket":"fragments","endpoint":"http://localhost:9000"}"#;
        let config: StorageConfig = serde_json::from_str(json).unwrap();
        match config {
            StorageConfig::S3 {
                force_path_style, ..
            } => assert!(!force_path_style),
            other => panic!("expected S3 config, got {other:?}"),
        }
    }

    #[test]
    fn test_storage_config_s3_validate_partial_credentials() {
        let invalid = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: Some("access-key".to_string()),
            secret_access_key: None,
            force_path_style: false,
        };
        assert!(invalid.validate().is_err());

        let valid = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_server_config_rejects_bad_api_url() {
        let config = ServerConfig {
            api_url: Some("fragments.example.com".to_string()),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_config_rejects_short_hash() {
        let config = AuthConfig {
            users: vec![UserConfig {
                email: "a@b.c".to_string(),
                password_hash: "abc".to_string(),
            }],
        };
        assert!(config.validate().is_err());
        assert!(AuthConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_types_policy() {
        let config = TypesConfig {
            allow_images: false,
        };
        assert!(!config.policy().is_supported("image/png"));
    }
}
