use super::TestRepo;
use crate::error::{ErrorKind, Stage};
use crate::forge::{DiffSource, ForgeClient};
use pretty_assertions::assert_eq;

#[test]
fn clean_tree_has_empty_diffs() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();

    assert_eq!(git.diff().unwrap(), "");
    assert_eq!(git.staged_diff().unwrap(), "");
}

#[test]
fn staging_moves_changes_into_the_staged_diff() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();
    repo.write("README.md", "# demo\nmore\n");

    assert!(git.diff().unwrap().contains("+more"));

    let staged = git.stage_and_diff().unwrap();
    assert!(staged.contains("+more"));
    assert_eq!(git.diff().unwrap(), "");

    // staging twice changes nothing
    git.stage_all().unwrap();
    assert_eq!(git.staged_diff().unwrap(), staged);
}

#[test]
fn commit_writes_subject_and_body() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();
    repo.write("lib.rs", "fn main() {}\n");
    git.stage_all().unwrap();

    git.commit("feat: add entry point", "- adds lib.rs").unwrap();

    let message = repo.git(&["log", "-1", "--format=%B"]);
    assert_eq!(message.trim_end(), "feat: add entry point\n\n- adds lib.rs");
}

#[test]
fn commit_with_nothing_staged_fails() {
    let Some(repo) = TestRepo::create() else { return };
    let err = repo.client().commit("t", "m").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProcessExecution);
}

#[test]
fn existing_branch_is_switched_to() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();
    repo.git(&["branch", "existing-branch"]);

    git.create_or_switch_branch("existing-branch").unwrap();
    assert_eq!(git.current_branch().unwrap(), "existing-branch");

    git.create_or_switch_branch("fresh-branch").unwrap();
    assert_eq!(git.current_branch().unwrap(), "fresh-branch");
}

#[test]
fn invalid_branch_name_fails() {
    let Some(repo) = TestRepo::create() else { return };
    assert!(repo.client().create_or_switch_branch("bad..name").is_err());
}

#[test]
fn three_dot_diff_ignores_changes_on_base() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();

    git.create_or_switch_branch("topic").unwrap();
    repo.write("topic.txt", "topic work\n");
    git.stage_all().unwrap();
    git.commit("feat: topic", "- topic.txt").unwrap();

    repo.git(&["checkout", "--quiet", "main"]);
    repo.write("main.txt", "main work\n");
    git.stage_all().unwrap();
    git.commit("chore: main", "- main.txt").unwrap();
    repo.git(&["checkout", "--quiet", "topic"]);

    let diff = git.diff_against_ref("main").unwrap();
    assert!(diff.contains("topic.txt"));
    assert!(!diff.contains("main.txt"));
    assert_eq!(git.changed_files_against_ref("main").unwrap(), vec!["topic.txt"]);
}

#[test]
fn push_sets_upstream_for_current_branch() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();

    git.create_or_switch_branch("feature/push").unwrap();
    git.push_with_identity().unwrap();

    assert!(repo.remote_has_branch("feature/push"));
    let upstream = repo.git(&["rev-parse", "--abbrev-ref", "@{upstream}"]);
    assert_eq!(upstream.trim(), "origin/feature/push");
}

#[test]
fn commit_and_push_round() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();
    repo.write("notes.txt", "hello\n");
    git.stage_all().unwrap();

    git.commit_and_push("docs: add notes", "- notes.txt").unwrap();
    assert!(repo.remote_has_branch("main"));
}

#[test]
fn pull_request_without_forge_fails_at_its_stage() {
    let Some(repo) = TestRepo::create() else { return };
    let forge = ForgeClient::new(repo.client()).with_program("prscribe-missing-forge");

    let err = forge
        .create_pull_request("topic", "feat: x", "- y")
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::PullRequest));
    assert!(repo.remote_has_branch("topic"));
}

#[test]
fn missing_forge_falls_back_to_git_diff() {
    let Some(repo) = TestRepo::create() else { return };
    let git = repo.client();
    git.create_or_switch_branch("topic").unwrap();
    repo.write("topic.txt", "topic work\n");
    git.stage_all().unwrap();
    git.commit("feat: topic", "- topic.txt").unwrap();

    let forge = ForgeClient::new(repo.client()).with_program("prscribe-missing-forge");
    let diff = forge.diff_against_ref_via_forge("main", Some("topic")).unwrap();

    assert_eq!(diff.source, DiffSource::Git);
    assert!(diff.value.contains("topic.txt"));
}
