use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_RESUME_PATH: &str = "resume.md";

/// Publication target. Beta and prod never share a storage prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Beta,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Beta => "beta",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beta" => Ok(Environment::Beta),
            "prod" => Ok(Environment::Prod),
            other => bail!("ENV must be 'beta' or 'prod', got '{other}'"),
        }
    }
}

/// Pipeline configuration loaded from the CI job's environment variables.
/// Every required variable is checked before any AWS client is built.
#[derive(Debug, Clone)]
pub struct Config {
    pub aws_region: String,
    pub bedrock_region: String,
    pub bucket_name: String,
    pub deployment_table: String,
    pub analytics_table: String,
    pub environment: Environment,
    pub commit_sha: String,
    pub model_id: String,
    pub resume_path: PathBuf,
    /// Skip the Bedrock calls entirely and use the deterministic paths.
    pub disable_model: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let aws_region = require_env(&lookup, "AWS_REGION")?;
        let bedrock_region = optional_env(&lookup, "BEDROCK_REGION")
            .unwrap_or_else(|| aws_region.clone());

        Ok(Config {
            bedrock_region,
            bucket_name: require_env(&lookup, "BUCKET_NAME")?,
            deployment_table: require_env(&lookup, "DEPLOYMENT_TABLE")?,
            analytics_table: require_env(&lookup, "ANALYTICS_TABLE")?,
            environment: require_env(&lookup, "ENV")?
                .parse::<Environment>()
                .context("Invalid ENV")?,
            commit_sha: require_env(&lookup, "COMMIT_SHA")?,
            model_id: require_env(&lookup, "MODEL_ID")?,
            resume_path: optional_env(&lookup, "RESUME_PATH")
                .unwrap_or_else(|| DEFAULT_RESUME_PATH.to_string())
                .into(),
            disable_model: optional_env(&lookup, "DISABLE_MODEL")
                .map(|v| parse_flag(&v))
                .transpose()?
                .unwrap_or(false),
            rust_log: optional_env(&lookup, "RUST_LOG").unwrap_or_else(|| "info".to_string()),
            aws_region,
        })
    }
}

fn require_env<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional_env(lookup, key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Empty values count as unset, matching how CI renders missing secrets.
fn optional_env<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("DISABLE_MODEL must be a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        vars(&[
            ("AWS_REGION", "us-east-1"),
            ("BUCKET_NAME", "ai-resume-iamwillsoto"),
            ("DEPLOYMENT_TABLE", "DeploymentTracking"),
            ("ANALYTICS_TABLE", "ResumeAnalytics"),
            ("ENV", "beta"),
            ("COMMIT_SHA", "abc123"),
            ("MODEL_ID", "anthropic.claude-3-haiku-20240307-v1:0"),
        ])
    }

    fn load(env: &HashMap<String, String>) -> Result<Config> {
        Config::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_loads_required_variables() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.bucket_name, "ai-resume-iamwillsoto");
        assert_eq!(config.environment, Environment::Beta);
        assert_eq!(config.commit_sha, "abc123");
        assert_eq!(config.resume_path, PathBuf::from("resume.md"));
        assert!(!config.disable_model);
    }

    #[test]
    fn test_bedrock_region_defaults_to_aws_region() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.bedrock_region, "us-east-1");

        let mut env = full_env();
        env.insert("BEDROCK_REGION".into(), "us-west-2".into());
        assert_eq!(load(&env).unwrap().bedrock_region, "us-west-2");
    }

    #[test]
    fn test_missing_variable_names_the_key() {
        let mut env = full_env();
        env.remove("DEPLOYMENT_TABLE");
        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("DEPLOYMENT_TABLE"));
    }

    #[test]
    fn test_empty_variable_is_missing() {
        let mut env = full_env();
        env.insert("COMMIT_SHA".into(), "  ".into());
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_unknown_environment_rejected() {
        let mut env = full_env();
        env.insert("ENV".into(), "staging".into());
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_environment_parse_is_case_insensitive() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!(Environment::Prod.to_string(), "prod");
    }

    #[test]
    fn test_disable_model_flag() {
        let mut env = full_env();
        env.insert("DISABLE_MODEL".into(), "true".into());
        assert!(load(&env).unwrap().disable_model);

        env.insert("DISABLE_MODEL".into(), "maybe".into());
        assert!(load(&env).is_err());
    }
}
