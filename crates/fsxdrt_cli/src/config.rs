use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use fsxdrt_client::ClientConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub aws: AwsSection,
    #[serde(default)]
    pub client: ClientSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AwsSection {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    pub connect_timeout_secs: Option<f64>,
    pub read_timeout_secs: Option<f64>,
    pub operation_timeout_secs: Option<f64>,
    pub max_attempts: Option<u32>,
}

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub aws: AwsSection,
    pub client: ClientSection,
}

impl RuntimeConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&source)
            .with_context(|| format!("invalid config TOML at {}", path.display()))
    }

    pub fn client_config(&self, overrides: &Overrides) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();
        let aws = &self.aws;
        let client = &self.client;

        Ok(ClientConfig {
            region: overrides.aws.region.clone().or_else(|| aws.region.clone()),
            profile: overrides.aws.profile.clone().or_else(|| aws.profile.clone()),
            endpoint_url: overrides
                .aws
                .endpoint_url
                .clone()
                .or_else(|| aws.endpoint_url.clone()),
            connect_timeout: pick_timeout(
                "connect_timeout_secs",
                overrides.client.connect_timeout_secs,
                client.connect_timeout_secs,
                defaults.connect_timeout,
            )?,
            read_timeout: pick_timeout(
                "read_timeout_secs",
                overrides.client.read_timeout_secs,
                client.read_timeout_secs,
                defaults.read_timeout,
            )?,
            operation_timeout: pick_timeout(
                "operation_timeout_secs",
                overrides.client.operation_timeout_secs,
                client.operation_timeout_secs,
                defaults.operation_timeout,
            )?,
            max_attempts: overrides
                .client
                .max_attempts
                .or(client.max_attempts)
                .unwrap_or(defaults.max_attempts),
        })
    }
}

fn pick_timeout(
    name: &str,
    flag: Option<f64>,
    file: Option<f64>,
    default: Duration,
) -> Result<Duration> {
    match flag.or(file) {
        None => Ok(default),
        Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs)
            .map_err(|err| anyhow!("{name} = {secs} is not a usable duration: {err}")),
        Some(secs) => Err(anyhow!("{name} must be greater than zero, got {secs}")),
    }
}
