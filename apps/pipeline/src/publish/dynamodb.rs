use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::SecondsFormat;

use crate::models::analysis::AnalysisRecord;
use crate::models::deployment::DeploymentRecord;
use crate::publish::RecordStore;

type Item = HashMap<String, AttributeValue>;

pub struct DynamoRecordStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoRecordStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("DynamoDB PutItem on {table} failed: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put_deployment(&self, table: &str, record: &DeploymentRecord) -> Result<()> {
        self.put_item(table, deployment_item(record)).await
    }

    async fn put_analysis(&self, table: &str, record: &AnalysisRecord) -> Result<()> {
        self.put_item(table, analysis_item(record)).await
    }
}

fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

fn n(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().map(|v| s(v.as_str())).collect())
}

fn deployment_item(record: &DeploymentRecord) -> Item {
    HashMap::from([
        ("deployment_id".to_string(), s(&record.deployment_id)),
        ("run_id".to_string(), s(record.run_id.to_string())),
        ("commit_sha".to_string(), s(&record.commit_sha)),
        ("environment".to_string(), s(record.environment.as_str())),
        ("status".to_string(), s(&record.status)),
        ("s3_url".to_string(), s(&record.url)),
        ("model_used".to_string(), s(record.model_used.as_str())),
        (
            "timestamp".to_string(),
            s(record.deployed_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ),
    ])
}

fn analysis_item(record: &AnalysisRecord) -> Item {
    let analytics = &record.analytics;
    HashMap::from([
        ("analysis_id".to_string(), s(&record.analysis_id)),
        ("commit_sha".to_string(), s(&record.commit_sha)),
        ("environment".to_string(), s(record.environment.as_str())),
        ("model_used".to_string(), s(record.model_used.as_str())),
        (
            "timestamp".to_string(),
            s(record.analyzed_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ),
        ("word_count".to_string(), n(analytics.word_count)),
        ("ats_score".to_string(), n(analytics.ats_score)),
        ("keywords".to_string(), string_list(&analytics.keywords)),
        ("readability".to_string(), s(&analytics.readability)),
        (
            "missing_sections".to_string(),
            string_list(&analytics.missing_sections),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::models::analysis::AtsAnalytics;
    use crate::models::ModelUsed;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_deployment_item_attributes() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = DeploymentRecord {
            deployment_id: "abc#prod".into(),
            run_id: Uuid::nil(),
            commit_sha: "abc".into(),
            environment: Environment::Prod,
            status: "success".into(),
            url: "http://bucket.s3-website-us-east-1.amazonaws.com/prod/index.html".into(),
            model_used: ModelUsed::Model("anthropic.claude-3-haiku-20240307-v1:0".into()),
            deployed_at: at,
        };

        let item = deployment_item(&record);
        assert_eq!(item["deployment_id"], s("abc#prod"));
        assert_eq!(item["environment"], s("prod"));
        assert_eq!(item["timestamp"], s("2026-03-01T12:00:00.000Z"));
        assert_eq!(
            item["model_used"],
            s("anthropic.claude-3-haiku-20240307-v1:0")
        );
    }

    #[test]
    fn test_analysis_item_attributes() {
        let record = AnalysisRecord {
            analysis_id: "abc-20260301T120000.000Z".into(),
            commit_sha: "abc".into(),
            environment: Environment::Beta,
            model_used: ModelUsed::Fallback,
            analyzed_at: Utc::now(),
            analytics: AtsAnalytics {
                word_count: 412,
                ats_score: 78,
                keywords: vec!["aws".into(), "terraform".into()],
                readability: "Good".into(),
                missing_sections: vec![],
            },
        };

        let item = analysis_item(&record);
        assert_eq!(item["ats_score"], n(78));
        assert_eq!(item["word_count"], AttributeValue::N("412".into()));
        assert_eq!(item["model_used"], s("fallback-deterministic"));
        assert_eq!(item["keywords"], AttributeValue::L(vec![s("aws"), s("terraform")]));
        assert_eq!(item["missing_sections"], AttributeValue::L(vec![]));
    }
}
