//! Orchestrates a migration run over the project manifest.

mod config;
mod error;

pub use config::{RefactorSteps, RunnerConfig, DEFAULT_GITLAB_URL};
pub use error::RunnerError;

use crate::manifest::{get_member_list, get_project_list, MemberMap, ProjectRecord};
use crate::merge_requests::fetch_open_merge_requests;
use crate::outcome::OperationOutcome;
use crate::pipeline::update_pipeline_file;
use crate::platform::{MergeRequestSource, RepositoryHost};
use crate::pull_requests::create_pull_request;
use crate::remotes::{self, RemoteRewriteOptions, RemoteStatus};
use crate::rename::rename_repository;
use crate::scm::update_scm_connections;
use crate::sink::ResultSink;
use crate::summary::{ProjectOutcome, ProjectStatus, RunSummary, Step};
use crate::urls::{extract_repository_path, RepositoryPath, UrlError};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

/// A project after its independent steps, before the serial ones.
struct Staged {
    outcome: ProjectOutcome,
    resolved: bool,
}

/// Runs the migration commands against injected platforms and a result sink.
pub struct Runner {
    config: RunnerConfig,
    sink: Arc<dyn ResultSink>,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    pub fn new(config: RunnerConfig, sink: Arc<dyn ResultSink>) -> Self {
        Self { config, sink }
    }

    /// Renames, rewrites `pom.xml` and rewrites the pipeline entry of every
    /// project in the manifest.
    ///
    /// Renames and SCM rewrites of up to `concurrency` projects overlap.
    /// Pipeline rewrites all touch the same file, so they run afterwards one
    /// at a time in manifest order. Each project is recorded once all its
    /// steps have run.
    pub async fn refactor(&self, host: &dyn RepositoryHost) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new();
        let projects = get_project_list(self.config.project_list_path())?;
        let steps = self.config.steps();
        info!(
            count = projects.len(),
            concurrency = self.config.concurrency(),
            rename = steps.rename,
            scm = steps.scm,
            pipeline = steps.pipeline,
            "Refactoring projects"
        );

        let staged: Vec<Staged> = stream::iter(projects.iter())
            .map(|project| self.rename_and_rewrite(host, project))
            .buffered(self.config.concurrency())
            .collect()
            .await;

        for (project, staged) in projects.iter().zip(staged) {
            let mut outcome = staged.outcome;
            if staged.resolved && steps.pipeline {
                match self.config.pipeline() {
                    Some(file) => {
                        let span = info_span!("project", repo = %outcome.new_url);
                        let result = update_pipeline_file(
                            host,
                            file,
                            &project.old_source_url,
                            &outcome.new_url,
                        )
                        .instrument(span)
                        .await;
                        outcome.updated_services = result.updated_services;
                        outcome.push(Step::PipelineRewrite, result.outcome);
                    }
                    None => warn!("No pipeline file configured, skipping pipeline rewrite"),
                }
            }
            self.finish(&mut summary, &outcome)?;
        }

        Ok(summary)
    }

    /// Replays every open merge request of each project as a pull request.
    pub async fn migrate_merge_requests(
        &self,
        source: &dyn MergeRequestSource,
        host: &dyn RepositoryHost,
    ) -> Result<RunSummary, RunnerError> {
        let members_path =
            self.config
                .members_list_path()
                .ok_or(RunnerError::MissingConfig {
                    name: "MEMBERS_LIST_FILE_PATH",
                })?;
        let members = MemberMap::from_records(&get_member_list(members_path)?);
        let projects = get_project_list(self.config.project_list_path())?;
        info!(
            projects = projects.len(),
            members = members.len(),
            "Migrating merge requests"
        );

        let mut summary = RunSummary::new();
        for project in &projects {
            let span = info_span!("project", repo = %project.new_destination_url);
            let outcome = self
                .migrate_project(source, host, &members, project)
                .instrument(span)
                .await;
            self.finish(&mut summary, &outcome)?;
        }
        Ok(summary)
    }

    /// Points every working copy under `root` at its destination repository.
    pub async fn rewrite_remotes(
        &self,
        root: &Path,
        options: &RemoteRewriteOptions,
    ) -> Result<RunSummary, RunnerError> {
        let projects = get_project_list(self.config.project_list_path())?;
        info!(root = %root.display(), "Rewriting remotes");

        let mut summary = RunSummary::new();
        for result in remotes::rewrite_remotes(root, &projects, options).await? {
            if let RemoteStatus::Failed(message) = &result.status {
                error!(dir = %result.directory.display(), error = %message, "Remote rewrite failed");
            }
            summary.record_remote(&result);
            self.sink.record_remote(&result)?;
        }
        Ok(summary)
    }

    /// Destination repository of a manifest URL, under the configured
    /// organisation when one is set.
    fn destination_path(&self, url: &str) -> Result<RepositoryPath, UrlError> {
        let path = extract_repository_path(url)?;
        Ok(match self.config.github_org() {
            Some(org) => RepositoryPath::new(org, path.name()),
            None => path,
        })
    }

    async fn rename_and_rewrite(
        &self,
        host: &dyn RepositoryHost,
        project: &ProjectRecord,
    ) -> Staged {
        let span = info_span!("project", repo = %project.new_destination_url);
        let steps = self.config.steps();

        async {
            let mut outcome =
                ProjectOutcome::new(&project.old_source_url, &project.new_destination_url);

            let mut destination = match self.destination_path(&project.new_destination_url) {
                Ok(path) => path,
                Err(e) => {
                    error!(error = %e, "Unusable destination URL");
                    let enabled = [
                        (steps.rename && project.new_name.is_some(), Step::Rename),
                        (steps.scm, Step::ScmRewrite),
                        (steps.pipeline, Step::PipelineRewrite),
                    ];
                    for (_, step) in enabled.iter().filter(|(on, _)| *on) {
                        outcome.push(*step, OperationOutcome::failure(e.to_string()));
                    }
                    return Staged {
                        outcome,
                        resolved: false,
                    };
                }
            };

            if steps.rename {
                if let Some(new_name) = project
                    .new_name
                    .as_deref()
                    .filter(|name| *name != destination.name())
                {
                    let renamed = rename_repository(host, &destination, new_name).await;
                    if !renamed.had_error {
                        destination = destination.with_name(new_name);
                        if let Some(url) = &renamed.new_url {
                            outcome.new_url.clone_from(url);
                        }
                    }
                    outcome.push(Step::Rename, renamed);
                }
            }

            if steps.scm {
                let url = format!("https://github.com/{destination}.git");
                let scm = update_scm_connections(&url, self.config.github_token()).await;
                outcome.push(Step::ScmRewrite, scm);
            }

            Staged {
                outcome,
                resolved: true,
            }
        }
        .instrument(span)
        .await
    }

    async fn migrate_project(
        &self,
        source: &dyn MergeRequestSource,
        host: &dyn RepositoryHost,
        members: &MemberMap,
        project: &ProjectRecord,
    ) -> ProjectOutcome {
        let mut outcome =
            ProjectOutcome::new(&project.old_source_url, &project.new_destination_url);

        let paths = extract_repository_path(&project.old_source_url).and_then(|source_path| {
            Ok((source_path, self.destination_path(&project.new_destination_url)?))
        });
        let (source_path, destination) = match paths {
            Ok(paths) => paths,
            Err(e) => {
                error!(error = %e, "Unusable project URL");
                outcome.push(
                    Step::FetchMergeRequests,
                    OperationOutcome::failure(e.to_string()),
                );
                return outcome;
            }
        };

        let fetched = fetch_open_merge_requests(source, &source_path).await;
        let fetch_failed = fetched.outcome.had_error;
        outcome.push(Step::FetchMergeRequests, fetched.outcome);
        if fetch_failed {
            return outcome;
        }

        // The source lists newest first; replay oldest first.
        for record in fetched.records.iter().rev() {
            let created = create_pull_request(
                host,
                &destination,
                record,
                members,
                self.config.draft_pull_requests(),
            )
            .await;
            outcome.push(Step::PullRequest(record.id), created);
        }
        outcome
    }

    fn finish(&self, summary: &mut RunSummary, outcome: &ProjectOutcome) -> Result<(), RunnerError> {
        match outcome.status() {
            ProjectStatus::Success => info!(repo = %outcome.new_url, "Project migrated"),
            ProjectStatus::PartialSuccess => warn!(
                repo = %outcome.new_url,
                failed = ?outcome.failed_steps(),
                "Project partially migrated"
            ),
            ProjectStatus::Failure => error!(repo = %outcome.new_url, "Project failed"),
        }
        self.sink.record(outcome)?;
        summary.record_project(outcome);
        Ok(())
    }
}
