//! Idempotent provisioning of the destination bucket and its notification
//! topic, and upload of the converted artifacts.
//!
//! The publisher is bound to one bucket and one set of allow-lists for the
//! lifetime of a run. `setup_infrastructure` reconciles the remote resources
//! toward the desired state and is safe to re-run: the topic is created or
//! reused by name, a bucket that already exists is logged and kept, and
//! policies and website configuration are overwritten wholesale rather than
//! merged. Only the bucket-already-exists condition is swallowed; every
//! other remote failure propagates to the caller.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;
use tracing::{info, warn};

use crate::convert::{JSON_ARTIFACT, YAML_ARTIFACT};
use crate::error::Error;
use crate::store::{RoutingRule, StoreClient, StoreError, WebsiteConfig};

pub const DEFAULT_REGION: &str = "eu-west-1";

/// Read actions granted on the bucket and the published objects.
const READ_ACTIONS: [&str; 3] = ["s3:GetBucketWebsite", "s3:GetObject", "s3:ListBucket"];

/// Bucket events forwarded to the notification topic.
const NOTIFICATION_EVENTS: [&str; 1] = ["s3:ObjectCreated:*"];

/// Everything the publisher needs to know about the destination, threaded in
/// explicitly rather than via ambient state.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub bucket_name: String,
    pub region: String,
    /// IP ranges granted anonymous read access.
    pub allowed_ips: Vec<String>,
    /// AWS account ids granted read/subscribe access.
    pub allowed_account_ids: Vec<String>,
    /// AWS organization ids granted read access.
    pub allowed_organization_ids: Vec<String>,
}

impl PublishConfig {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            region: DEFAULT_REGION.to_string(),
            allowed_ips: Vec::new(),
            allowed_account_ids: Vec::new(),
            allowed_organization_ids: Vec::new(),
        }
    }
}

pub struct Publisher<C> {
    client: C,
    config: PublishConfig,
}

impl<C: StoreClient> Publisher<C> {
    pub fn new(client: C, config: PublishConfig) -> Self {
        Self { client, config }
    }

    /// Provision the topic and bucket, in dependency order: topic → topic
    /// policy → bucket → bucket policy → website → notification wiring.
    pub async fn setup_infrastructure(&self) -> Result<(), Error> {
        let bucket = &self.config.bucket_name;
        let topic_name = self.topic_name();

        info!(topic = %topic_name, "creating or reusing notification topic");
        let topic_arn = self.client.create_topic(&topic_name).await?;

        let topic_policy = to_policy_json(&self.topic_policy(&topic_arn))?;
        self.client
            .set_topic_attribute(&topic_arn, "Policy", &topic_policy)
            .await?;

        match self.client.create_bucket(bucket, &self.config.region).await {
            Ok(()) => info!(bucket = %bucket, region = %self.config.region, "bucket created"),
            Err(StoreError::BucketAlreadyExists(_)) => {
                warn!(bucket = %bucket, "bucket already exists, reusing it");
            }
            Err(e) => return Err(e.into()),
        }

        let bucket_policy = to_policy_json(&self.bucket_policy())?;
        self.client.put_bucket_policy(bucket, &bucket_policy).await?;

        self.client
            .put_bucket_website(bucket, &self.website_config())
            .await?;

        let events: Vec<String> = NOTIFICATION_EVENTS.iter().map(|e| e.to_string()).collect();
        self.client
            .put_bucket_notification(bucket, &topic_arn, &events)
            .await?;

        info!(bucket = %bucket, topic_arn = %topic_arn, "infrastructure is set up");
        Ok(())
    }

    /// Upload each artifact as its own object. Unrelated objects already in
    /// the bucket are left untouched.
    pub async fn upload_artifacts(
        &self,
        artifacts: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        for (key, content) in artifacts {
            let content_type = content_type_for(key);
            info!(bucket = %self.config.bucket_name, key = %key, content_type, "uploading artifact");
            self.client
                .put_object(
                    &self.config.bucket_name,
                    key,
                    content.as_bytes(),
                    content_type,
                )
                .await?;
        }
        Ok(())
    }

    /// SNS topic names reject dots, which are common in bucket names.
    fn topic_name(&self) -> String {
        self.config.bucket_name.replace('.', "-")
    }

    fn bucket_arn(&self) -> String {
        format!("arn:aws:s3:::{}", self.config.bucket_name)
    }

    /// Bucket policy: one statement for the allow-listed principals, one for
    /// anonymous reads scoped by source IP. Both statements are always
    /// present; an empty allow-list simply matches nobody. The organization
    /// condition is AND-ed onto the principal statement, so it is only
    /// emitted when organization ids were actually given; an empty
    /// `aws:PrincipalOrgID` list would lock out the account principals too.
    pub fn bucket_policy(&self) -> serde_json::Value {
        let resources = json!([self.bucket_arn(), format!("{}/*", self.bucket_arn())]);

        let mut principal_statement = json!({
            "Sid": "AllowListedPrincipalsRead",
            "Effect": "Allow",
            "Action": READ_ACTIONS,
            "Resource": resources.clone(),
            "Principal": { "AWS": &self.config.allowed_account_ids }
        });
        if !self.config.allowed_organization_ids.is_empty() {
            principal_statement["Condition"] = json!({
                "StringEquals": {
                    "aws:PrincipalOrgID": &self.config.allowed_organization_ids
                }
            });
        }

        json!({
            "Version": "2012-10-17",
            "Statement": [
                principal_statement,
                {
                    "Sid": "AllowListedIpsRead",
                    "Effect": "Allow",
                    "Action": READ_ACTIONS,
                    "Resource": resources,
                    "Principal": "*",
                    "Condition": {
                        "IpAddress": { "aws:SourceIp": &self.config.allowed_ips }
                    }
                }
            ]
        })
    }

    /// Topic policy: the storage service may publish bucket events, the
    /// allow-listed principals may subscribe.
    pub fn topic_policy(&self, topic_arn: &str) -> serde_json::Value {
        json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Sid": "AllowBucketPublish",
                    "Effect": "Allow",
                    "Principal": { "Service": "s3.amazonaws.com" },
                    "Action": "SNS:Publish",
                    "Resource": topic_arn,
                    "Condition": {
                        "ArnLike": { "aws:SourceArn": self.bucket_arn() }
                    }
                },
                {
                    "Sid": "AllowListedPrincipalsSubscribe",
                    "Effect": "Allow",
                    "Principal": { "AWS": &self.config.allowed_account_ids },
                    "Action": "SNS:Subscribe",
                    "Resource": topic_arn
                }
            ]
        })
    }

    /// Website config: the JSON artifact is the index document, and the
    /// `yaml`/`json` key prefixes redirect to the matching artifact.
    pub fn website_config(&self) -> WebsiteConfig {
        WebsiteConfig {
            index_document: JSON_ARTIFACT.to_string(),
            routing_rules: vec![
                RoutingRule {
                    key_prefix: "yaml".to_string(),
                    replace_key: YAML_ARTIFACT.to_string(),
                },
                RoutingRule {
                    key_prefix: "json".to_string(),
                    replace_key: JSON_ARTIFACT.to_string(),
                },
            ],
        }
    }
}

fn to_policy_json(policy: &serde_json::Value) -> Result<String, Error> {
    serde_json::to_string(policy).map_err(|e| Error::Serialization(Box::new(e)))
}

/// Content type for an artifact, inferred from its file extension.
pub fn content_type_for(key: &str) -> &'static str {
    match Path::new(key).extension().and_then(|ext| ext.to_str()) {
        Some("json") => "application/json",
        Some("yaml") | Some("yml") => "application/yaml",
        _ => "text/plain",
    }
}
