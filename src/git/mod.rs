use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{OpError, Outcome, Stage};
use crate::process::{run_checked, ProcessRunner, SystemRunner};


pub const GIT_SSH_COMMAND: &str = "GIT_SSH_COMMAND";

/// Where git operations run and which SSH identity pushes use.
///
/// Empty paths count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryContext {
    pub repository_path: Option<PathBuf>,
    pub ssh_key_path: Option<PathBuf>,
}

impl RepositoryContext {
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        Self {
            repository_path: Some(repository_path.into()),
            ssh_key_path: None,
        }
    }

    pub fn with_ssh_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.ssh_key_path = Some(key_path.into());
        self
    }

    pub fn repository_path(&self) -> Outcome<&Path> {
        non_empty(self.repository_path.as_deref()).ok_or(OpError::ConfigurationMissing("Repository path"))
    }

    pub fn ssh_key_path(&self) -> Outcome<&Path> {
        non_empty(self.ssh_key_path.as_deref()).ok_or(OpError::ConfigurationMissing("SSH key path"))
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Value of `GIT_SSH_COMMAND` that pins pushes to a single key.
pub fn ssh_command(key_path: &Path) -> String {
    format!("ssh -i {} -o IdentitiesOnly=yes", key_path.display())
}

/// Typed git operations against one repository.
///
/// Every operation checks its configuration first, so a client built from an
/// incomplete [`RepositoryContext`] fails per call instead of at construction.
#[derive(Debug, Clone)]
pub struct GitClient<R = SystemRunner> {
    context: RepositoryContext,
    runner: R,
    program: String,
}

impl GitClient<SystemRunner> {
    pub fn new(context: RepositoryContext) -> Self {
        Self::with_runner(context, SystemRunner)
    }
}

impl<R: ProcessRunner> GitClient<R> {
    pub fn with_runner(context: RepositoryContext, runner: R) -> Self {
        Self {
            context,
            runner,
            program: "git".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn context(&self) -> &RepositoryContext {
        &self.context
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn git(&self, args: &[&str]) -> Outcome<String> {
        let repo = self.context.repository_path()?;
        run_checked(&self.runner, &self.program, args, repo, &[])
    }

    /// Unstaged changes of the working tree. A clean tree yields an empty string.
    pub fn diff(&self) -> Outcome<String> {
        self.git(&["diff"])
    }

    /// Changes already in the index.
    pub fn staged_diff(&self) -> Outcome<String> {
        self.git(&["diff", "--staged"])
    }

    /// Changes on `HEAD` since it diverged from `base` (three-dot form).
    pub fn diff_against_ref(&self, base: &str) -> Outcome<String> {
        let range = format!("{}...HEAD", base);
        self.git(&["diff", &range])
    }

    /// Paths touched on `HEAD` since it diverged from `base`.
    pub fn changed_files_against_ref(&self, base: &str) -> Outcome<Vec<String>> {
        let range = format!("{}...HEAD", base);
        let output = self.git(&["diff", "--name-only", &range])?;
        Ok(parse_name_list(&output))
    }

    pub fn stage_all(&self) -> Outcome<()> {
        self.git(&["add", "."])?;
        info!("staged all changes");
        Ok(())
    }

    /// Stages the whole tree and returns what is now staged.
    pub fn stage_and_diff(&self) -> Outcome<String> {
        self.stage_all()?;
        self.staged_diff()
    }

    /// Commits the index with `title` as subject and `message` as body.
    ///
    /// Nothing staged is reported by git itself as a failure.
    pub fn commit(&self, title: &str, message: &str) -> Outcome<()> {
        self.git(&["commit", "-m", title, "-m", message])?;
        info!(title, "committed changes");
        Ok(())
    }

    pub fn current_branch(&self) -> Outcome<String> {
        let repo = self.context.repository_path()?;
        let output = run_checked(&self.runner, &self.program, &["branch", "--show-current"], repo, &[])?;
        let branch = output.trim_end();
        if branch.is_empty() {
            // detached HEAD prints nothing
            return Err(OpError::ProcessExecution {
                command: format!("{} branch", self.program),
                stderr: "no current branch (detached HEAD?)".to_string(),
            });
        }
        Ok(branch.to_string())
    }

    /// Pushes the current branch to `origin` with upstream tracking, using
    /// only the configured SSH key.
    pub fn push_with_identity(&self) -> Outcome<()> {
        let repo = self.context.repository_path()?;
        let key = self.context.ssh_key_path()?;
        let branch = self.current_branch()?;

        let ssh = ssh_command(key);
        run_checked(
            &self.runner,
            &self.program,
            &["push", "-u", "origin", &branch],
            repo,
            &[(GIT_SSH_COMMAND, ssh.as_str())],
        )?;
        info!(%branch, "pushed to origin");
        Ok(())
    }

    /// Creates `name` and checks it out, or checks it out if creation fails.
    pub fn create_or_switch_branch(&self, name: &str) -> Outcome<()> {
        match self.git(&["checkout", "-b", name]) {
            Ok(_) => {
                info!(branch = name, "created branch");
                Ok(())
            }
            Err(OpError::ProcessExecution { stderr, .. }) => {
                debug!(branch = name, %stderr, "branch creation failed, switching instead");
                self.git(&["checkout", name])?;
                info!(branch = name, "switched to existing branch");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Commits then pushes, checking both repository and key before touching git.
    pub fn commit_and_push(&self, title: &str, message: &str) -> Outcome<()> {
        self.context.repository_path()?;
        self.context.ssh_key_path()?;

        self.commit(title, message).map_err(|e| e.in_stage(Stage::Commit))?;
        self.push_with_identity().map_err(|e| e.in_stage(Stage::Push))
    }

    /// Working tree summary from `git status --porcelain`.
    pub fn status(&self) -> Outcome<GitChanges> {
        let output = self.git(&["status", "--porcelain"])?;
        Ok(GitChanges::from_porcelain(&output))
    }
}

pub(crate) fn parse_name_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct GitChanges {
    pub staged_modified: Vec<String>,
    pub staged_added: Vec<String>,
    pub staged_deleted: Vec<String>,
    /// Renamed or copied in the index, by new path.
    pub staged_renamed: Vec<String>,
    pub unstaged_modified: Vec<String>,
    pub unstaged_deleted: Vec<String>,
    pub untracked: Vec<String>,
    pub conflicted: Vec<String>,
    /// Lines with a status code this parser does not know.
    pub other: Vec<String>,
}

impl GitChanges {
    /// Parses `git status --porcelain` (v1). Index and worktree columns are
    /// read independently, so `MM` lands in both a staged and an unstaged list.
    pub fn from_porcelain(output: &str) -> Self {
        let mut changes = GitChanges::default();

        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            let mut code = line.chars();
            let (index, worktree) = match (code.next(), code.next()) {
                (Some(x), Some(y)) if line.len() > 3 && line.is_char_boundary(3) => (x, y),
                _ => {
                    warn!(%line, "malformed status line");
                    changes.other.push(line.trim().to_string());
                    continue;
                }
            };
            let path = line[3..].trim();

            if index == '?' && worktree == '?' {
                changes.untracked.push(path.to_string());
                continue;
            }
            if index == '!' && worktree == '!' {
                continue;
            }
            if is_unmerged(index, worktree) {
                changes.conflicted.push(path.to_string());
                continue;
            }

            let index_known = matches!(index, ' ' | 'M' | 'T' | 'A' | 'D' | 'R' | 'C');
            let worktree_known = matches!(worktree, ' ' | 'M' | 'T' | 'D');
            if !index_known || !worktree_known || (index == ' ' && worktree == ' ') {
                warn!(?index, ?worktree, %path, "unhandled status code");
                changes.other.push(path.to_string());
                continue;
            }

            let target = renamed_target(path).to_string();
            match index {
                'M' | 'T' => changes.staged_modified.push(target.clone()),
                'A' => changes.staged_added.push(target.clone()),
                'D' => changes.staged_deleted.push(target.clone()),
                'R' | 'C' => changes.staged_renamed.push(target.clone()),
                _ => {}
            }
            match worktree {
                'M' | 'T' => changes.unstaged_modified.push(target),
                'D' => changes.unstaged_deleted.push(target),
                _ => {}
            }
        }

        changes
    }

    pub fn is_clean(&self) -> bool {
        self.staged_modified.is_empty()
            && self.staged_added.is_empty()
            && self.staged_deleted.is_empty()
            && self.staged_renamed.is_empty()
            && self.unstaged_modified.is_empty()
            && self.unstaged_deleted.is_empty()
            && self.untracked.is_empty()
            && self.conflicted.is_empty()
            && self.other.is_empty()
    }
}

fn is_unmerged(index: char, worktree: char) -> bool {
    matches!(
        (index, worktree),
        ('D', 'D') | ('A', 'A') | ('U', _) | (_, 'U')
    )
}

// `R  old -> new` reports the new path
fn renamed_target(path: &str) -> &str {
    path.rsplit_once(" -> ").map_or(path, |(_, new)| new)
}
