use tracing::{info, warn};

use crate::error::{OpError, Outcome, Stage};
use crate::git::{parse_name_list, GitClient};
use crate::process::{run_checked, ProcessRunner, SystemRunner};

/// Which tool produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSource {
    Forge,
    Git,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DiffSource,
}

/// Pull-request level operations on top of [`GitClient`], using the forge CLI
/// (`gh` by default) when it works and plain git when it does not.
#[derive(Debug, Clone)]
pub struct ForgeClient<R = SystemRunner> {
    git: GitClient<R>,
    program: String,
}

impl<R: ProcessRunner> ForgeClient<R> {
    pub fn new(git: GitClient<R>) -> Self {
        Self {
            git,
            program: "gh".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn git(&self) -> &GitClient<R> {
        &self.git
    }

    fn forge(&self, args: &[&str]) -> Outcome<String> {
        let repo = self.git.context().repository_path()?;
        if !self.git.runner().is_available(&self.program) {
            return Err(OpError::ProcessSpawn {
                program: self.program.clone(),
                reason: "not found in PATH".to_string(),
            });
        }
        run_checked(self.git.runner(), &self.program, args, repo, &[])
    }

    /// Diff of the open pull request for `branch` (or the current branch) as the forge reports it.
    pub fn pr_diff(&self, branch: Option<&str>) -> Outcome<String> {
        let mut args = vec!["pr", "diff"];
        args.extend(branch);
        self.forge(&args)
    }

    /// File names of the open pull request for `branch`.
    pub fn pr_changed_files(&self, branch: Option<&str>) -> Outcome<Vec<String>> {
        let mut args = vec!["pr", "diff", "--name-only"];
        args.extend(branch);
        Ok(parse_name_list(&self.forge(&args)?))
    }

    /// Pull-request diff from the forge, or `git diff <base>...HEAD` when the
    /// forge tool is missing or fails.
    pub fn diff_against_ref_via_forge(
        &self,
        base: &str,
        branch_hint: Option<&str>,
    ) -> Outcome<Sourced<String>> {
        fallback(
            || self.pr_diff(branch_hint),
            || self.git.diff_against_ref(base),
        )
    }

    /// Switches to `branch`, then takes its diff against `base` the same way as
    /// [`diff_against_ref_via_forge`](Self::diff_against_ref_via_forge).
    pub fn branch_diff(&self, branch: &str, base: &str) -> Outcome<Sourced<String>> {
        self.git
            .create_or_switch_branch(branch)
            .map_err(|e| e.in_stage(Stage::Checkout))?;
        self.diff_against_ref_via_forge(base, Some(branch))
    }

    pub fn changed_files_via_forge(
        &self,
        base: &str,
        branch_hint: Option<&str>,
    ) -> Outcome<Sourced<Vec<String>>> {
        fallback(
            || self.pr_changed_files(branch_hint),
            || self.git.changed_files_against_ref(base),
        )
    }

    /// Checks out `branch` (creating it if needed), pushes it and opens a pull
    /// request for it. Returns whatever the forge prints, normally the PR URL.
    ///
    /// Stops at the first failing stage; the error names that stage.
    pub fn create_pull_request(&self, branch: &str, title: &str, body: &str) -> Outcome<String> {
        self.git
            .create_or_switch_branch(branch)
            .map_err(|e| e.in_stage(Stage::Checkout))?;

        self.git
            .push_with_identity()
            .map_err(|e| e.in_stage(Stage::Push))?;

        let output = self
            .forge(&["pr", "create", "--title", title, "--body", body, "--head", branch])
            .map_err(|e| e.in_stage(Stage::PullRequest))?;

        let url = output.trim().to_string();
        info!(%branch, %url, "opened pull request");
        Ok(url)
    }
}

/// Runs `primary`; on any failure runs `secondary` instead.
fn fallback<T>(
    primary: impl FnOnce() -> Outcome<T>,
    secondary: impl FnOnce() -> Outcome<T>,
) -> Outcome<Sourced<T>> {
    match primary() {
        Ok(value) => Ok(Sourced {
            value,
            source: DiffSource::Forge,
        }),
        Err(e) => {
            warn!(error = %e, "forge query failed, falling back to git");
            secondary().map(|value| Sourced {
                value,
                source: DiffSource::Git,
            })
        }
    }
}
