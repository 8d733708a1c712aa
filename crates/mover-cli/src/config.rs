//! AWS settings shared by the source and destination queues.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sqs::config::Credentials;

const DEFAULT_REGION: &str = "us-east-1";
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

#[derive(Clone, Debug, Default, clap::Args)]
pub struct AwsOptions {
    /// AWS profile for the source and destination queues
    #[arg(short, long)]
    pub profile: Option<String>,

    /// AWS region for the source and destination queues
    #[arg(short, long)]
    pub region: Option<String>,

    /// Use static test credentials against a local SQS such as LocalStack
    #[arg(long)]
    pub local: bool,

    /// SQS endpoint to talk to instead of the AWS default
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl AwsOptions {
    /// Region falls back to the SDK's provider chain (env, profile), then us-east-1.
    pub async fn load(&self) -> SdkConfig {
        let region = RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::from_static(DEFAULT_REGION));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        if self.local {
            loader = loader
                .credentials_provider(Credentials::new("test", "test", None, None, "static"))
                .endpoint_url(self.endpoint.as_deref().unwrap_or(LOCALSTACK_ENDPOINT));
        } else if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }
}
