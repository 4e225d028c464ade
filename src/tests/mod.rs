use crate::git::{GitClient, RepositoryContext};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

mod git_workflow;

// Test utilities and helpers
pub(crate) struct TestRepo {
    work: TempDir,
    remote: TempDir,
}

impl TestRepo {
    /// A repository on `main` with one commit and a bare `origin`.
    /// `None` when git is not installed.
    pub fn create() -> Option<Self> {
        if which::which("git").is_err() {
            eprintln!("git not found, skipping");
            return None;
        }

        let repo = Self {
            work: tempfile::tempdir().ok()?,
            remote: tempfile::tempdir().ok()?,
        };

        git(repo.remote.path(), &["init", "--bare", "--quiet"]);
        git(repo.path(), &["init", "--quiet"]);
        git(repo.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(repo.path(), &["config", "user.email", "dev@example.com"]);
        git(repo.path(), &["config", "user.name", "Dev"]);
        git(repo.path(), &["config", "commit.gpgsign", "false"]);
        let remote = repo.remote.path().to_string_lossy().into_owned();
        git(repo.path(), &["remote", "add", "origin", &remote]);

        repo.write("README.md", "# demo\n");
        git(repo.path(), &["add", "."]);
        git(repo.path(), &["commit", "--quiet", "-m", "initial"]);

        Some(repo)
    }

    pub fn path(&self) -> &Path {
        self.work.path()
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).expect("write file");
    }

    pub fn key_path(&self) -> PathBuf {
        self.work.path().join("id_test")
    }

    pub fn client(&self) -> GitClient {
        GitClient::new(RepositoryContext::new(self.path()).with_ssh_key(self.key_path()))
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(self.path(), args)
    }

    pub fn remote_has_branch(&self, branch: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
            .current_dir(self.remote.path())
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}
