//! S3-compatible storage backend using AWS SDK.

use crate::error::{StorageError, StorageResult};
use crate::traits::{DataStore, data_key};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::future::ProvideCredentials as ProvideCredentialsFuture;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_smithy_http_client::Builder as SmithyHttpClientBuilder;
use bytes::Bytes;
use fragments_core::{FragmentId, OwnerId};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::instrument;

const DEFAULT_REGION: &str = "us-east-1";
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_CHECK_MARKER: &str = ".fragments-health-check";

/// Marker carried by credential chain failures so they surface as
/// configuration errors instead of opaque transport errors.
const CREDENTIALS_ERROR_MARKER: &str = "fragments-s3-credentials";

/// Builds the AWS default credentials chain on the first signed request
/// rather than at construction time.
#[derive(Debug)]
struct LazyDefaultCredentials {
    region: String,
    chain: OnceCell<aws_config::default_provider::credentials::DefaultCredentialsChain>,
}

impl LazyDefaultCredentials {
    fn new(region: String) -> Self {
        Self {
            region,
            chain: OnceCell::new(),
        }
    }

    async fn credentials(&self) -> aws_credential_types::provider::Result {
        let chain = self
            .chain
            .get_or_init(|| async {
                aws_config::default_provider::credentials::DefaultCredentialsChain::builder()
                    .region(aws_config::Region::new(self.region.clone()))
                    .build()
                    .await
            })
            .await;
        chain.provide_credentials().await.map_err(|err| {
            CredentialsError::provider_error(format!("{CREDENTIALS_ERROR_MARKER}: {err}"))
        })
    }
}

impl ProvideCredentials for LazyDefaultCredentials {
    fn provide_credentials<'a>(&'a self) -> ProvideCredentialsFuture<'a>
    where
        Self: 'a,
    {
        ProvideCredentialsFuture::new(self.credentials())
    }
}

fn map_s3_operation_error<E>(err: SdkError<E>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if err.to_string().contains(CREDENTIALS_ERROR_MARKER) {
        return StorageError::Config(
            "S3 credential resolution failed. Configure access_key_id/secret_access_key or provide ambient AWS credentials."
                .to_string(),
        );
    }
    StorageError::S3(Box::new(err))
}

fn is_not_found<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() == 404)
}

/// Prepend `http://` to bare `host:port` endpoints.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let lower = endpoint.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

/// Object key for fragment data, with the optional prefix applied.
pub fn object_key(prefix: Option<&str>, owner_id: &OwnerId, id: &FragmentId) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}/{}", data_key(owner_id, id)),
        None => data_key(owner_id, id),
    }
}

/// S3-compatible data store. Objects are keyed `[prefix/]{owner}/{id}`.
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    endpoint: Option<String>,
    region: String,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl S3Backend {
    /// Create a new S3 backend.
    ///
    /// `force_path_style` selects `endpoint/bucket/key` URLs, which MinIO and
    /// most self-hosted S3 implementations need.
    pub async fn new(
        bucket: &str,
        endpoint: Option<String>,
        region: Option<String>,
        prefix: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        force_path_style: bool,
    ) -> StorageResult<Self> {
        let region = region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()));

        builder = match (access_key_id, secret_access_key) {
            (Some(key_id), Some(secret)) => builder.credentials_provider(
                aws_sdk_s3::config::Credentials::new(key_id, secret, None, None, "fragments-config"),
            ),
            (None, None) => {
                builder.credentials_provider(LazyDefaultCredentials::new(region.clone()))
            }
            _ => {
                return Err(StorageError::Config(
                    "s3 config requires both access_key_id and secret_access_key when either is set"
                        .to_string(),
                ));
            }
        };

        let endpoint = endpoint.as_deref().map(normalize_endpoint);
        if let Some(url) = &endpoint {
            builder = builder.endpoint_url(url);
            // Plain HTTP endpoints (local MinIO) don't need a TLS-capable client.
            if url.to_ascii_lowercase().starts_with("http://") {
                builder = builder.http_client(SmithyHttpClientBuilder::new().build_http());
            }
        }
        if force_path_style {
            builder = builder.force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: bucket.to_string(),
            prefix: prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            endpoint,
            region,
        })
    }

    fn key(&self, owner_id: &OwnerId, id: &FragmentId) -> String {
        object_key(self.prefix.as_deref(), owner_id, id)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(map_s3_operation_error(err)),
        }
    }
}

#[async_trait]
impl DataStore for S3Backend {
    #[instrument(skip(self, data), fields(backend = "s3", size = data.len()))]
    async fn put_data(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: Bytes,
    ) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.key(owner_id, id))
            .body(data.into())
            .send()
            .await
            .map_err(map_s3_operation_error)?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn get_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<Option<Bytes>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.key(owner_id, id))
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if is_not_found(&err) => return Ok(None),
            Err(err) => return Err(map_s3_operation_error(err)),
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(Box::new(e)))?
            .into_bytes();
        Ok(Some(bytes))
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn delete_data(&self, owner_id: &OwnerId, id: &FragmentId) -> StorageResult<()> {
        let key = self.key(owner_id, id);

        // delete_object succeeds for missing keys, so check first to report NotFound.
        if !self.exists(&key).await? {
            return Err(StorageError::NotFound(data_key(owner_id, id)));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(map_s3_operation_error)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn health_check(&self) -> StorageResult<()> {
        let marker_key = match &self.prefix {
            Some(prefix) => format!("{prefix}/{HEALTH_CHECK_MARKER}"),
            None => HEALTH_CHECK_MARKER.to_string(),
        };

        let probe = async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&marker_key)
                .body(Bytes::from_static(b"health-check").into())
                .send()
                .await
                .map_err(map_s3_operation_error)?;

            match self
                .client
                .delete_object()
                .bucket(&self.bucket)
                .key(&marker_key)
                .send()
                .await
            {
                Ok(_) => Ok(()),
                Err(err) if is_not_found(&err) => Ok(()),
                Err(err) => Err(map_s3_operation_error(err)),
            }
        };

        tokio::time::timeout(HEALTH_CHECK_TIMEOUT, probe)
            .await
            .map_err(|_| {
                StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "S3 health check timed out after 10 seconds",
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_with_and_without_prefix() {
        let owner = OwnerId::parse("abc").unwrap();
        let id = FragmentId::parse("f1").unwrap();
        assert_eq!(object_key(Some("fragments"), &owner, &id), "fragments/abc/f1");
        assert_eq!(object_key(None, &owner, &id), "abc/f1");
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("minio:9000"), "http://minio:9000");
        assert_eq!(normalize_endpoint("HTTPS://s3.test"), "HTTPS://s3.test");
        assert_eq!(normalize_endpoint("http://s3.test"), "http://s3.test");
    }

    #[tokio::test]
    async fn test_s3_new_requires_complete_credentials() {
        let err = S3Backend::new(
            "bucket",
            None,
            Some("us-east-1".to_string()),
            None,
            Some("access".to_string()),
            None,
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StorageError::Config(_)));
    }

    #[tokio::test]
    async fn test_s3_new_trims_prefix() {
        let backend = S3Backend::new(
            "bucket",
            Some("minio:9000".to_string()),
            None,
            Some("/fragments/".to_string()),
            Some("access".to_string()),
            Some("secret".to_string()),
            true,
        )
        .await
        .unwrap();

        let owner = OwnerId::parse("abc").unwrap();
        let id = FragmentId::parse("f1").unwrap();
        assert_eq!(backend.key(&owner, &id), "fragments/abc/f1");
        assert_eq!(backend.endpoint.as_deref(), Some("http://minio:9000"));
        assert_eq!(backend.region, "us-east-1");
    }
}
