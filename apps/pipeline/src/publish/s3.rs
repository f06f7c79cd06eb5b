use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::publish::{ObjectLocation, ObjectStore};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_html(&self, location: &ObjectLocation, html: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .body(ByteStream::from(html.as_bytes().to_vec()))
            .content_type(HTML_CONTENT_TYPE)
            .cache_control("no-cache")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }
}
