mod config;
mod progress;

use anyhow::Context;
use clap::Parser;
use config::AwsOptions;
use mover::{
    MoveConfig, MoveReport, Mover, QueueService, SqsQueues, TransferProgress, TransferState,
};
use progress::ProgressReporter;

#[tokio::main]
pub async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = Cli::parse().run().await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, Parser)]
#[command(name = "sqs-mover")]
#[command(
    about = "move every message from one aws sqs queue to another, e.g. out of a dead letter queue",
    long_about = None
)]
pub struct Cli {
    /// Source queue to move messages from, by name or url
    #[arg(short, long)]
    source: String,

    /// Destination queue to move messages to, by name or url
    #[arg(short, long)]
    destination: String,

    #[command(flatten)]
    aws: AwsOptions,

    /// Seconds a received batch stays hidden from other consumers
    #[arg(
        long,
        default_value_t = mover::DEFAULT_VISIBILITY_TIMEOUT,
        value_parser = clap::value_parser!(i32).range(1..=mover::MAX_VISIBILITY_TIMEOUT as i64)
    )]
    visibility_timeout: i32,

    /// Messages moved per batch
    #[arg(
        long,
        default_value_t = mover::MAX_BATCH_SIZE,
        value_parser = clap::value_parser!(i32).range(1..=10)
    )]
    batch_size: i32,

    /// Print the final report as json on stdout
    #[arg(long)]
    json: bool,
}

/// What `--json` prints once the transfer stops.
#[derive(Debug, serde::Serialize)]
struct Summary {
    state: TransferState,
    #[serde(flatten)]
    progress: TransferProgress,
    batches: usize,
    error: Option<String>,
}

impl From<&MoveReport> for Summary {
    fn from(report: &MoveReport) -> Self {
        Self {
            state: report.state(),
            progress: report.progress,
            batches: report.batches,
            error: report.error.as_ref().map(ToString::to_string),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let queues = SqsQueues::from_config(self.aws.load().await);

        let source = queues
            .resolve(&self.source)
            .await
            .context("failed to resolve source queue")?;
        log::info!("source queue url: {source}");

        let destination = queues
            .resolve(&self.destination)
            .await
            .context("failed to resolve destination queue")?;
        log::info!("destination queue url: {destination}");

        let approximate_total = queues
            .approximate_count(&source)
            .await
            .context("failed to read the size of the source queue")?;
        log::info!("approximate number of messages in the source queue: {approximate_total}");

        let config = MoveConfig::new(source, destination)?
            .with_batch_size(self.batch_size)
            .with_visibility_timeout(self.visibility_timeout);
        let mover = Mover::new(queues, config);

        let mut reporter = ProgressReporter::new(approximate_total)?;
        let report = mover.run(approximate_total, &mut reporter).await;
        reporter.finish();

        if self.json {
            println!("{}", serde_json::to_string(&Summary::from(&report))?);
        }

        let moved = report.moved();
        match report.into_result() {
            Ok(_) => {
                log::info!("done, moved {moved} messages");
                Ok(())
            }
            Err(e) => {
                if e.may_duplicate() {
                    log::warn!(
                        "some messages of the last batch may be in both queues, \
                         a rerun will deliver them again"
                    );
                }
                Err(anyhow::Error::new(e)
                    .context(format!("moved {moved} messages before failing")))
            }
        }
    }
}
