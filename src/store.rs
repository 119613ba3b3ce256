//! Remote object-store/notification contract.
//!
//! This module defines a single trait ([`StoreClient`]) and the value types
//! carried across it. The trait covers exactly the remote operations the
//! publishing workflow needs: bucket creation, policy and website
//! configuration, object upload, topic creation and notification wiring.
//!
//! The trait is implemented by the real AWS client (`crate::aws`) and by
//! test mocks/fakes. It is annotated for `mockall` so consumers can generate
//! deterministic mocks in unit and integration tests.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

/// Failures coming back from the remote service.
///
/// Bucket-already-exists is the only condition the publisher treats as
/// expected; everything else is an opaque service failure propagated to the
/// caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bucket {0} already exists")]
    BucketAlreadyExists(String),

    #[error("remote service error: {0}")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Static-website configuration for the destination bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteConfig {
    /// Object served for requests to the bucket root.
    pub index_document: String,
    pub routing_rules: Vec<RoutingRule>,
}

/// Redirects requests whose key starts with `key_prefix` to `replace_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub key_prefix: String,
    pub replace_key: String,
}

/// Client for the object store and its notification service.
///
/// All operations are blocking round-trips from the caller's point of view;
/// the publisher invokes them strictly sequentially.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Create a bucket in the given region. Returns
    /// [`StoreError::BucketAlreadyExists`] when the bucket is already there.
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StoreError>;

    /// Replace the bucket's access policy with the given JSON document.
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StoreError>;

    /// Replace the bucket's static-website configuration.
    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), StoreError>;

    /// Write a single object. Must not affect any other object in the bucket.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Create a notification topic, or return the existing one with the same
    /// name. Returns the topic ARN.
    async fn create_topic(&self, name: &str) -> Result<String, StoreError>;

    /// Set a single attribute (e.g. `Policy`) on a topic.
    async fn set_topic_attribute(
        &self,
        topic_arn: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Replace the bucket's notification configuration so the given events
    /// are published to the topic.
    async fn put_bucket_notification(
        &self,
        bucket: &str,
        topic_arn: &str,
        events: &[String],
    ) -> Result<(), StoreError>;
}
