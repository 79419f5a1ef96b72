mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fsxdrt_client::{AwsServices, FsxService, IdentityProvider, ObjectStore};
use fsxdrt_contract::TaskAction;
use fsxdrt_core::{build_and_submit, list_reports, TaskInput};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{AwsSection, ClientSection, Overrides, RuntimeConfig};
use crate::output::{render_reports, render_task, OutputFormat};

const DEFAULT_LOG_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn";

#[derive(Debug, Parser)]
#[command(author, version, about = "Create FSx for Lustre data repository tasks")]
struct Cli {
    /// Optional TOML file with `[aws]` and `[client]` sections.
    #[arg(long, global = true, env = "FSX_DRT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    region: Option<String>,
    #[arg(long, global = true)]
    profile: Option<String>,
    #[arg(long, global = true)]
    endpoint_url: Option<String>,
    #[arg(long, global = true)]
    connect_timeout_secs: Option<f64>,
    #[arg(long, global = true)]
    read_timeout_secs: Option<f64>,
    #[arg(long, global = true)]
    operation_timeout_secs: Option<f64>,
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Skip the STS caller-identity check before contacting FSx.
    #[arg(long, global = true)]
    skip_identity_check: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import metadata from the associated S3 repository.
    Import(TaskArgs),
    /// Export filesystem paths to the associated S3 repository.
    Export(TaskArgs),
    /// List completion reports under the report destination.
    Reports(ReportArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Import(_) => "import",
            Self::Export(_) => "export",
            Self::Reports(_) => "reports",
        }
    }
}

#[derive(Debug, Clone, Args)]
struct TaskArgs {
    #[arg(long)]
    filesystem_id: String,
    #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
    paths: Vec<String>,
    #[arg(long)]
    completion_report_path: String,
    #[arg(long)]
    report_scope: Option<String>,
}

impl TaskArgs {
    fn to_input(&self) -> TaskInput {
        let input = TaskInput::new(
            self.filesystem_id.clone(),
            self.paths.clone(),
            self.completion_report_path.clone(),
        );
        match &self.report_scope {
            Some(scope) => input.with_report_scope(scope.clone()),
            None => input,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct ReportArgs {
    #[arg(long)]
    filesystem_id: String,
    #[arg(long)]
    completion_report_path: String,
}

/// The remote services one invocation talks to.
struct Services<'a> {
    fsx: &'a dyn FsxService,
    store: &'a dyn ObjectStore,
    identity: &'a dyn IdentityProvider,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let span = info_span!(
        "invocation",
        id = %Uuid::now_v7(),
        command = cli.command.name()
    );
    async move {
        match run(&cli).await {
            Ok(rendered) => {
                println!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "fsx-drt failed");
                ExitCode::FAILURE
            }
        }
    }
    .instrument(span)
    .await
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: &Cli) -> Result<String> {
    if let Command::Import(args) | Command::Export(args) = &cli.command {
        args.to_input().validate()?;
    }

    let runtime = RuntimeConfig::load(cli.config.as_deref())?;
    let client_config = runtime.client_config(&cli.overrides())?;
    let aws = AwsServices::connect(&client_config).await;

    let services = Services {
        fsx: &aws.fsx,
        store: &aws.s3,
        identity: &aws.sts,
    };
    execute(cli, &services).await
}

async fn execute(cli: &Cli, services: &Services<'_>) -> Result<String> {
    if !cli.skip_identity_check {
        check_identity(services.identity).await?;
    }

    match &cli.command {
        Command::Import(args) => submit(services, TaskAction::Import, args, cli.output).await,
        Command::Export(args) => submit(services, TaskAction::Export, args, cli.output).await,
        Command::Reports(args) => {
            let listing = list_reports(
                services.fsx,
                services.store,
                &args.filesystem_id,
                &args.completion_report_path,
            )
            .await?;
            render_reports(&listing, cli.output)
        }
    }
}

async fn submit(
    services: &Services<'_>,
    action: TaskAction,
    args: &TaskArgs,
    format: OutputFormat,
) -> Result<String> {
    let response = build_and_submit(services.fsx, action, &args.to_input()).await?;
    info!(
        task_id = %response.task_id,
        lifecycle = response.lifecycle.as_deref().unwrap_or("<unknown>"),
        "{} task created",
        action.as_str()
    );
    render_task(&response, format)
}

async fn check_identity(identity: &dyn IdentityProvider) -> Result<()> {
    let caller = identity
        .caller_identity()
        .await
        .context("no usable AWS credentials")?;
    let arn = caller
        .arn
        .as_deref()
        .ok_or_else(|| anyhow!("caller identity carries no ARN"))?;
    info!(
        account = caller.account.as_deref().unwrap_or("<unknown>"),
        arn = %arn,
        "verified AWS caller identity"
    );
    Ok(())
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            aws: AwsSection {
                region: self.region.clone(),
                profile: self.profile.clone(),
                endpoint_url: self.endpoint_url.clone(),
            },
            client: ClientSection {
                connect_timeout_secs: self.connect_timeout_secs,
                read_timeout_secs: self.read_timeout_secs,
                operation_timeout_secs: self.operation_timeout_secs,
                max_attempts: self.max_attempts,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use fsxdrt_client::{
        InMemoryFsxService, InMemoryIdentityProvider, InMemoryObjectStore, ServiceError,
    };
    use fsxdrt_contract::{Association, AssociationLifecycle, CallerIdentity, TaskKind};
    use fsxdrt_core::TaskError;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fsx-drt").chain(args.iter().copied()))
            .expect("parse")
    }

    fn fsx() -> InMemoryFsxService {
        InMemoryFsxService::new(vec![Association {
            association_id: Some("dra-1".to_string()),
            lifecycle: AssociationLifecycle::Available,
            data_repository_path: Some("s3://bucket/prefix/".to_string()),
            file_system_path: Some("/data".to_string()),
        }])
    }

    fn caller() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::new(CallerIdentity {
            account: Some("123456789012".to_string()),
            arn: Some("arn:aws:iam::123456789012:user/ops".to_string()),
            user_id: Some("AIDAEXAMPLE".to_string()),
        })
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn paths_accept_commas_and_repeats() {
        let cli = parse(&[
            "export",
            "--filesystem-id",
            "fs-0123456789",
            "--paths",
            "/a,/b",
            "--paths",
            "/c",
            "--completion-report-path",
            "/reports",
        ]);
        let Command::Export(args) = &cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.paths, vec!["/a", "/b", "/c"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(!cli.skip_identity_check);
    }

    #[test]
    fn task_commands_require_paths() {
        let parsed = Cli::try_parse_from([
            "fsx-drt",
            "import",
            "--filesystem-id",
            "fs-0123456789",
            "--completion-report-path",
            "/reports",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_become_overrides() {
        let cli = parse(&[
            "--region",
            "us-east-2",
            "--max-attempts",
            "1",
            "reports",
            "--filesystem-id",
            "fs-0123456789",
            "--completion-report-path",
            "/reports",
            "--read-timeout-secs",
            "5",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.aws.region.as_deref(), Some("us-east-2"));
        assert_eq!(overrides.client.max_attempts, Some(1));
        assert_eq!(overrides.client.read_timeout_secs, Some(5.0));
        assert_eq!(overrides.aws.profile, None);
    }

    #[tokio::test]
    async fn invalid_input_fails_before_configuration_is_read() {
        let cli = parse(&[
            "--config",
            "/nonexistent/fsx-drt.toml",
            "export",
            "--filesystem-id",
            "vol-123",
            "--paths",
            "/data",
            "--completion-report-path",
            "/reports",
        ]);

        let error = run(&cli).await.expect_err("invalid id");
        assert!(matches!(
            error.downcast_ref::<TaskError>(),
            Some(TaskError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn export_submits_and_renders_the_task() {
        let cli = parse(&[
            "--output",
            "text",
            "export",
            "--filesystem-id",
            "fs-0123456789",
            "--paths",
            "/data/a",
            "--completion-report-path",
            "/reports",
        ]);
        let fsx = fsx();
        let store = InMemoryObjectStore::new();
        let identity = caller();
        let services = Services {
            fsx: &fsx,
            store: &store,
            identity: &identity,
        };

        let rendered = execute(&cli, &services).await.expect("submitted");
        assert!(rendered.starts_with("task: task-"));
        assert!(rendered.contains("type: EXPORT_TO_REPOSITORY"));

        let submitted = fsx.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].kind, TaskKind::ExportToRepository);
        assert_eq!(submitted[0].report.path.as_str(), "s3://bucket/prefix/reports");
    }

    #[tokio::test]
    async fn missing_credentials_stop_before_fsx() {
        let cli = parse(&[
            "import",
            "--filesystem-id",
            "fs-0123456789",
            "--paths",
            "s3://bucket/prefix/in",
            "--completion-report-path",
            "/reports",
        ]);
        let fsx = fsx();
        let store = InMemoryObjectStore::new();
        let identity = InMemoryIdentityProvider::anonymous();
        let services = Services {
            fsx: &fsx,
            store: &store,
            identity: &identity,
        };

        let error = execute(&cli, &services).await.expect_err("no identity");
        assert!(error.to_string().contains("no usable AWS credentials"));
        assert_eq!(fsx.describe_calls(), 0);
        assert_eq!(fsx.create_calls(), 0);
    }

    #[tokio::test]
    async fn identity_check_can_be_skipped() {
        let cli = parse(&[
            "--skip-identity-check",
            "reports",
            "--filesystem-id",
            "fs-0123456789",
            "--completion-report-path",
            "/reports",
        ]);
        let fsx = fsx();
        let store = InMemoryObjectStore::new().with_object("bucket", "prefix/reports/r.csv", 9);
        let identity = InMemoryIdentityProvider::anonymous();
        let services = Services {
            fsx: &fsx,
            store: &store,
            identity: &identity,
        };

        let rendered = execute(&cli, &services).await.expect("listing");
        assert!(rendered.contains("prefix/reports/r.csv"));
    }

    #[tokio::test]
    async fn remote_errors_keep_the_service_message() {
        let cli = parse(&[
            "--skip-identity-check",
            "export",
            "--filesystem-id",
            "fs-0123456789",
            "--paths",
            "/data",
            "--completion-report-path",
            "/reports",
        ]);
        let fsx = fsx().with_create_failure(ServiceError::Api {
            code: Some("BadRequest".to_string()),
            message: "Paths overlap an active task".to_string(),
            metadata: Default::default(),
        });
        let store = InMemoryObjectStore::new();
        let identity = InMemoryIdentityProvider::anonymous();
        let services = Services {
            fsx: &fsx,
            store: &store,
            identity: &identity,
        };

        let error = execute(&cli, &services).await.expect_err("rejected");
        assert_eq!(error.to_string(), "Paths overlap an active task");
    }
}
