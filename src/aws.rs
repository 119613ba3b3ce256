//! Production [`StoreClient`] backed by the AWS SDK (S3 + SNS).
//!
//! Thin translation layer only: all provisioning decisions live in
//! `crate::publish`. Credentials and endpoint configuration come from the
//! standard SDK environment (env vars, profile, instance metadata).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, Condition, CreateBucketConfiguration, Event, IndexDocument,
    NotificationConfiguration, Redirect, RoutingRule, TopicConfiguration, WebsiteConfiguration,
};
use tracing::{debug, info};

use crate::store::{StoreClient, StoreError, WebsiteConfig};

pub struct AwsStoreClient {
    s3: aws_sdk_s3::Client,
    sns: aws_sdk_sns::Client,
}

impl AwsStoreClient {
    /// Build S3 and SNS clients for the given region from the shared SDK
    /// environment.
    pub async fn new(region: &str) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        info!(region = %region, "initialized AWS clients");
        Self {
            s3: aws_sdk_s3::Client::new(&shared),
            sns: aws_sdk_sns::Client::new(&shared),
        }
    }
}

fn service_err<E>(error: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Service(Box::new(error))
}

#[async_trait]
impl StoreClient for AwsStoreClient {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StoreError> {
        let location = CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build();

        let result = self
            .s3
            .create_bucket()
            .bucket(bucket)
            .create_bucket_configuration(location)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_bucket_already_owned_by_you() || err.is_bucket_already_exists() {
                    Err(StoreError::BucketAlreadyExists(bucket.to_string()))
                } else {
                    Err(service_err(err))
                }
            }
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StoreError> {
        debug!(bucket = %bucket, "putting bucket policy");
        self.s3
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| service_err(e.into_service_error()))
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), StoreError> {
        let index = IndexDocument::builder()
            .suffix(website.index_document.as_str())
            .build()
            .map_err(service_err)?;

        let mut rules = Vec::with_capacity(website.routing_rules.len());
        for rule in &website.routing_rules {
            let rule = RoutingRule::builder()
                .condition(
                    Condition::builder()
                        .key_prefix_equals(rule.key_prefix.as_str())
                        .build(),
                )
                .redirect(
                    Redirect::builder()
                        .replace_key_with(rule.replace_key.as_str())
                        .build(),
                )
                .build();
            rules.push(rule);
        }

        let configuration = WebsiteConfiguration::builder()
            .index_document(index)
            .set_routing_rules(Some(rules))
            .build();

        debug!(bucket = %bucket, "putting bucket website configuration");
        self.s3
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(configuration)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| service_err(e.into_service_error()))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        debug!(bucket = %bucket, key = %key, bytes = body.len(), "putting object");
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| service_err(e.into_service_error()))
    }

    async fn create_topic(&self, name: &str) -> Result<String, StoreError> {
        let output = self
            .sns
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|e| service_err(e.into_service_error()))?;

        output
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| StoreError::Service("create_topic returned no topic ARN".into()))
    }

    async fn set_topic_attribute(
        &self,
        topic_arn: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        debug!(topic_arn = %topic_arn, attribute = %name, "setting topic attribute");
        self.sns
            .set_topic_attributes()
            .topic_arn(topic_arn)
            .attribute_name(name)
            .attribute_value(value)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| service_err(e.into_service_error()))
    }

    async fn put_bucket_notification(
        &self,
        bucket: &str,
        topic_arn: &str,
        events: &[String],
    ) -> Result<(), StoreError> {
        let events: Vec<Event> = events.iter().map(|e| Event::from(e.as_str())).collect();
        let topic_configuration = TopicConfiguration::builder()
            .topic_arn(topic_arn)
            .set_events(Some(events))
            .build()
            .map_err(service_err)?;
        let configuration = NotificationConfiguration::builder()
            .topic_configurations(topic_configuration)
            .build();

        debug!(bucket = %bucket, topic_arn = %topic_arn, "putting bucket notification configuration");
        self.s3
            .put_bucket_notification_configuration()
            .bucket(bucket)
            .notification_configuration(configuration)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| service_err(e.into_service_error()))
    }
}
