//! Amazon S3 (or S3-compatible) object storage.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;
use hrflow_core::storage::{ObjectStorage, StorageError};

/// Connection settings for an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Static credentials. When absent the default AWS provider chain is used.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    pub endpoint: Option<String>,
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable                | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `AWS_S3_BUCKET_NAME`    | yes      | -       |
    /// | `AWS_REGION`            | yes      | -       |
    /// | `AWS_ACCESS_KEY_ID`     | no       | -       |
    /// | `AWS_SECRET_ACCESS_KEY` | no       | -       |
    /// | `S3_ENDPOINT`           | no       | -       |
    pub fn from_env() -> Result<Self, StorageError> {
        let required = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| StorageError::Config(format!("{key} must be set for S3 storage")))
        };
        let optional = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Ok(Self {
            bucket: required("AWS_S3_BUCKET_NAME")?,
            region: required("AWS_REGION")?,
            access_key_id: optional("AWS_ACCESS_KEY_ID"),
            secret_access_key: optional("AWS_SECRET_ACCESS_KEY"),
            endpoint: optional("S3_ENDPOINT"),
        })
    }

    /// Public URL of `key`.
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{key}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com/{key}", self.bucket, self.region),
        }
    }
}

/// [`ObjectStorage`] backed by an S3 bucket.
pub struct S3Storage {
    client: Client,
    config: S3Config,
}

impl S3Storage {
    /// Build a client for `config`.
    pub async fn new(config: S3Config) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let (Some(ak), Some(sk)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                ak.clone(),
                sk.clone(),
                None,
                None,
                "static",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        Self { client, config }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "S3 upload failed");
                StorageError::Upload(e.to_string())
            })?;

        tracing::debug!(key, size, bucket = %self.config.bucket, "Object stored in S3");
        Ok(self.config.object_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: Option<&str>) -> S3Config {
        S3Config {
            bucket: "hr-docs".to_string(),
            region: "eu-west-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            endpoint: endpoint.map(str::to_string),
        }
    }

    #[test]
    fn virtual_hosted_url_by_default() {
        assert_eq!(
            config(None).object_url("documents/1/EMP/2/a.pdf"),
            "https://hr-docs.s3.eu-west-1.amazonaws.com/documents/1/EMP/2/a.pdf"
        );
    }

    #[test]
    fn path_style_url_for_custom_endpoint() {
        assert_eq!(
            config(Some("http://localhost:9090/")).object_url("k"),
            "http://localhost:9090/hr-docs/k"
        );
    }
}
