use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;

use prscribe::ai::SummaryClient;
use prscribe::config::{self, Config};
use prscribe::forge::{DiffSource, ForgeClient};
use prscribe::git::GitClient;
use prscribe::logging;
use prscribe::GeneratedSummary;

#[derive(Parser)]
#[command(name = "prscribe", version, about = "AI-written commits and pull requests from your diffs")]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// Show what is staged, modified and untracked
    Status,
    /// Print a diff
    Diff {
        /// Only staged changes
        #[arg(long, conflicts_with = "against")]
        staged: bool,
        /// Changes since the branch diverged from this ref
        #[arg(long)]
        against: Option<String>,
        /// Ask the forge for the pull request diff first
        #[arg(long, requires = "against")]
        forge: bool,
    },
    /// Stage everything and print a generated title and message
    Generate {
        /// Summarise committed work since this ref instead
        #[arg(long)]
        against: Option<String>,
    },
    /// Stage everything and commit with a generated message
    Commit {
        /// Push afterwards using the configured SSH key
        #[arg(long)]
        push: bool,
        /// Use this title instead of generating one
        #[arg(long, requires = "message")]
        title: Option<String>,
        #[arg(long, requires = "title")]
        message: Option<String>,
    },
    /// Commit pending work on a branch and open a pull request for it
    Pr {
        branch: String,
        /// Base the pull request diff is taken against
        #[arg(long, default_value = "main")]
        base: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing(logging::level_for(cli.verbose));

    // Fresh on every command so edits apply without restarting anything.
    let config = Config::load_or_default()?;
    let git = GitClient::new(config.repository_context()).with_program(&config.tools.git);

    match cli.command {
        Commands::Init => init()?,
        Commands::Status => {
            let changes = git.status()?;
            if changes.is_clean() {
                println!("{}", "Working tree clean".green());
            }
            print_group("staged, added", &changes.staged_added);
            print_group("staged, modified", &changes.staged_modified);
            print_group("staged, deleted", &changes.staged_deleted);
            print_group("staged, renamed", &changes.staged_renamed);
            print_group("modified", &changes.unstaged_modified);
            print_group("deleted", &changes.unstaged_deleted);
            print_group("untracked", &changes.untracked);
            print_group("conflicted", &changes.conflicted);
            print_group("other", &changes.other);
        }
        Commands::Diff {
            staged,
            against,
            forge,
        } => {
            let diff = match against {
                Some(base) if forge => {
                    let hint = git.current_branch().ok();
                    let sourced = forge_client(git, &config)
                        .diff_against_ref_via_forge(&base, hint.as_deref())?;
                    if sourced.source == DiffSource::Git {
                        eprintln!("{}", "forge unavailable, showing git diff".yellow());
                    }
                    sourced.value
                }
                Some(base) => git.diff_against_ref(&base)?,
                None if staged => git.staged_diff()?,
                None => git.diff()?,
            };
            print!("{}", diff);
        }
        Commands::Generate { against } => {
            let diff = match against {
                Some(base) => git.diff_against_ref(&base)?,
                None => git.stage_and_diff()?,
            };
            let summary = summarise(&config, &diff).await?;
            print_summary(&summary);
        }
        Commands::Commit {
            push,
            title,
            message,
        } => {
            let diff = git.stage_and_diff()?;
            if diff.is_empty() {
                println!("{}", "Nothing to commit".yellow());
                return Ok(());
            }

            let summary = match (title, message) {
                (Some(title), Some(message)) => GeneratedSummary { title, message },
                _ => summarise(&config, &diff).await?,
            };
            print_summary(&summary);

            if push {
                git.commit_and_push(&summary.title, &summary.message)?;
                println!("{}", "Committed and pushed".green().bold());
            } else {
                git.commit(&summary.title, &summary.message)?;
                println!("{}", "Committed".green().bold());
            }
        }
        Commands::Pr { branch, base } => {
            let pending = git.stage_and_diff()?;
            // branch_diff switches first, so the git fallback diffs `branch`
            let diff = if pending.is_empty() {
                forge_client(git.clone(), &config)
                    .branch_diff(&branch, &base)?
                    .value
            } else {
                pending.clone()
            };

            let summary = summarise(&config, &diff).await?;
            print_summary(&summary);

            if !pending.is_empty() {
                git.create_or_switch_branch(&branch)?;
                git.commit(&summary.title, &summary.message)?;
            }

            let url = forge_client(git, &config).create_pull_request(
                &branch,
                &summary.title,
                &summary.message,
            )?;
            println!("{} {}", "Pull request:".green().bold(), url);
        }
    }

    Ok(())
}

fn init() -> Result<()> {
    let config_path = config::get_config_path()?;
    if config_path.exists() {
        bail!("config already exists at {:?}", config_path);
    }
    Config::create_default(&config_path)?;
    println!("Created default config file at {:?}", config_path);
    println!("Set the repository path, SSH key path and API key, then run again.");
    Ok(())
}

fn forge_client(git: GitClient, config: &Config) -> ForgeClient {
    ForgeClient::new(git).with_program(&config.tools.forge)
}

async fn summarise(config: &Config, diff: &str) -> Result<GeneratedSummary> {
    if diff.is_empty() {
        bail!("No changes to summarise");
    }
    println!("{}", "Generating summary...".blue());
    Ok(SummaryClient::new(config.ai.clone()).generate_summary(diff).await?)
}

fn print_summary(summary: &GeneratedSummary) {
    println!("{} {}", "Title:".bold(), summary.title);
    println!("{}\n{}", "Message:".bold(), summary.message);
}

fn print_group(label: &str, files: &[String]) {
    if files.is_empty() {
        return;
    }
    println!("{}:", label.bold());
    for file in files {
        println!("  {}", file);
    }
}
