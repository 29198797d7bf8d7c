//! CLI for repo-migrator.
//!
//! Moves GitLab projects to GitHub: rewrites local remotes, replays open
//! merge requests as pull requests, and refactors build descriptors and
//! pipeline references to the new repository URLs.

use clap::{Args, Parser, Subcommand, ValueEnum};
use repo_migrator::{
    extract_repository_path, timestamped_output_directory, FileResultSink, GitHubHost,
    GitLabSource, PipelineFile, RefactorSteps, RemoteMode, RemoteRewriteOptions, RunSummary,
    Runner, RunnerConfig, RunnerError, DEFAULT_GITLAB_URL, LOG_FILE,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Repo Migrator - Move GitLab projects and their metadata to GitHub.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory the timestamped output directory is created in.
    #[arg(long, global = true, default_value = ".")]
    output_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rename repositories and rewrite pom.xml and pipeline references.
    Refactor(RefactorArgs),

    /// Replay open GitLab merge requests as GitHub pull requests.
    MigrateMergeRequests(MergeRequestArgs),

    /// Point local working copies under ROOT at their GitHub repositories.
    RewriteRemotes(RemoteArgs),
}

#[derive(Args, Debug)]
struct ProjectListArg {
    /// Tab-separated project manifest.
    #[arg(long, env = "PROJECT_LIST_FILE_PATH")]
    project_list: PathBuf,
}

#[derive(Args, Debug)]
struct RefactorArgs {
    #[command(flatten)]
    projects: ProjectListArg,

    /// GitHub organisation owning the migrated repositories.
    #[arg(long, env = "GITHUB_ORG_NAME")]
    github_org: String,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Repository holding the pipeline configuration file.
    #[arg(long, env = "GITHUB_DEVOPS_REPO_URL")]
    devops_repo_url: String,

    /// Branch of the pipeline configuration file.
    #[arg(long, env = "GITHUB_DEVOPS_REPO_BRANCH_NAME")]
    devops_branch: String,

    /// Path of the pipeline configuration file.
    #[arg(long, env = "GITHUB_DEVOPS_REPO_FILE_PATH")]
    devops_file_path: String,

    /// Projects renamed and rewritten at once.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Skip repository renames.
    #[arg(long)]
    skip_rename: bool,

    /// Skip pom.xml rewrites.
    #[arg(long)]
    skip_scm: bool,

    /// Skip pipeline file rewrites.
    #[arg(long)]
    skip_pipeline: bool,
}

#[derive(Args, Debug)]
struct MergeRequestArgs {
    #[command(flatten)]
    projects: ProjectListArg,

    /// Tab-separated member manifest.
    #[arg(long, env = "MEMBERS_LIST_FILE_PATH")]
    members_list: PathBuf,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// GitLab Personal Access Token.
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: String,

    /// GitLab base URL.
    #[arg(long, env = "GITLAB_URL", default_value = DEFAULT_GITLAB_URL)]
    gitlab_url: String,

    /// Place pull requests under this organisation instead of the URL owner.
    #[arg(long, env = "GITHUB_ORG_NAME")]
    github_org: Option<String>,

    /// Open pull requests as drafts when the merge request is a draft.
    #[arg(long)]
    draft_pull_requests: bool,
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// Directory whose subdirectories are working copies.
    root: PathBuf,

    #[command(flatten)]
    projects: ProjectListArg,

    /// How the new remote replaces origin.
    #[arg(long, value_enum, default_value_t = ModeArg::Archive)]
    mode: ModeArg,

    /// Name the old origin is kept under in archive mode.
    #[arg(long, default_value = "gitlab")]
    archive_name: String,

    /// Use HTTPS remotes instead of SSH.
    #[arg(long)]
    https: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    /// Rename origin and add the new remote as origin.
    Archive,
    /// Overwrite the URL of origin.
    Overwrite,
}

impl From<ModeArg> for RemoteMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Archive => Self::Archive,
            ModeArg::Overwrite => Self::Overwrite,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Explicitly install aws-lc-rs as the process-wide rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // A missing .env file is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    // Parse arguments
    let cli = Cli::parse();

    let output_directory = timestamped_output_directory(&cli.output_root);
    if let Err(e) = init_tracing(&output_directory) {
        eprintln!(
            "Failed to prepare output directory {}: {e}",
            output_directory.display()
        );
        return ExitCode::from(2);
    }
    info!(output = %output_directory.display(), "Writing results");

    // Run the main logic
    match run(cli.command, &output_directory).await {
        Ok(summary) => {
            print_summary(&summary, &output_directory);
            ExitCode::from(exit_code(&summary))
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Events go to two layers: compact console output, and a plain-text
/// `migration.log` inside the output directory, which is created here.
/// `RUST_LOG` overrides the default `info` filter.
fn init_tracing(output_directory: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(output_directory)?;
    let log_file = File::create(output_directory.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

/// Main execution logic.
async fn run(command: Command, output_directory: &Path) -> Result<RunSummary, RunnerError> {
    let sink = Arc::new(FileResultSink::create(output_directory)?);

    match command {
        Command::Refactor(args) => {
            let pipeline = PipelineFile {
                repository: extract_repository_path(&args.devops_repo_url)?,
                branch: args.devops_branch,
                path: args.devops_file_path,
            };
            let config = RunnerConfig::new(args.projects.project_list, args.github_token.clone())
                .with_github_org(args.github_org)
                .with_pipeline(pipeline)
                .with_concurrency(args.concurrency)
                .with_steps(RefactorSteps {
                    rename: !args.skip_rename,
                    scm: !args.skip_scm,
                    pipeline: !args.skip_pipeline,
                });
            let host = GitHubHost::new(args.github_token)?;
            Runner::new(config, sink).refactor(&host).await
        }
        Command::MigrateMergeRequests(args) => {
            let mut config =
                RunnerConfig::new(args.projects.project_list, args.github_token.clone())
                    .with_members_list_path(args.members_list)
                    .with_draft_pull_requests(args.draft_pull_requests);
            if let Some(org) = args.github_org {
                config = config.with_github_org(org);
            }
            let source = GitLabSource::new(&args.gitlab_url, args.gitlab_token)?;
            let host = GitHubHost::new(args.github_token)?;
            Runner::new(config, sink)
                .migrate_merge_requests(&source, &host)
                .await
        }
        Command::RewriteRemotes(args) => {
            let options = RemoteRewriteOptions {
                mode: args.mode.into(),
                archive_name: args.archive_name,
                prefer_ssh: !args.https,
            };
            let config = RunnerConfig::new(args.projects.project_list, String::new());
            Runner::new(config, sink)
                .rewrite_remotes(&args.root, &options)
                .await
        }
    }
}

/// 0 when everything succeeded, 1 when any step failed.
fn exit_code(summary: &RunSummary) -> u8 {
    u8::from(summary.has_failures())
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary, output_directory: &Path) {
    println!("\nSummary:");
    println!("  Output: {}", output_directory.display());

    if summary.projects_processed > 0 {
        println!("  Projects processed: {}", summary.projects_processed);
        println!("  Succeeded: {}", summary.projects_succeeded);
        println!("  Partially succeeded: {}", summary.projects_partial);
        println!("  Failed: {}", summary.projects_failed);
    }

    if summary.pull_requests_created + summary.pull_requests_failed > 0 {
        println!("  PRs created: {}", summary.pull_requests_created);
        println!(
            "  PRs created with warnings: {}",
            summary.pull_requests_with_warnings
        );
        println!("  PRs failed: {}", summary.pull_requests_failed);
    }

    let remotes = summary.remotes_rewritten + summary.remotes_skipped + summary.remotes_failed;
    if remotes > 0 {
        println!("  Remotes rewritten: {}", summary.remotes_rewritten);
        println!("  Directories skipped: {}", summary.remotes_skipped);
        println!("  Remote rewrites failed: {}", summary.remotes_failed);
    }
}
