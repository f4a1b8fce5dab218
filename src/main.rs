//! relnote - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use git2::Repository;
use tracing::{debug, info};

use relnote::git::{self, Commit};
use relnote::github::{self, ReleasePrRequest, ReleasePrSettings};
use relnote::logging::{self, ColorChoice};
use relnote::notes::{ReleaseNotes, extract_notes};
use relnote::output::StepOutput;
use relnote::trigger::{self, Decision};

/// Extract conventional-commit release notes and open a release PR.
#[derive(Parser, Debug)]
#[command(name = "relnote")]
#[command(about = "Extract conventional-commit release notes and open a release PR")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// When to colour log output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    /// Append plain-text logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the release notes for the commit history
    Notes {
        #[command(flatten)]
        history: HistoryArgs,

        /// How to print the notes
        #[arg(long, value_enum, default_value_t = NotesFormat::Escaped)]
        format: NotesFormat,
    },

    /// Write the escaped notes as a CI step output
    Output {
        #[command(flatten)]
        history: HistoryArgs,

        /// Step output name
        #[arg(long, default_value = "notes")]
        name: String,
    },

    /// Run the whole workflow: trigger check, notes, step output, release PR
    ReleasePr(ReleasePrArgs),

    /// Delete local branches already merged into a base branch
    Prune {
        /// Branch that merged branches are measured against
        #[arg(long)]
        base: String,

        /// Path inside the git repository
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// List the branches without deleting them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Path inside the git repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Start of commit range, exclusive (tag, commit hash, or branch)
    #[arg(long)]
    from: Option<String>,

    /// End of commit range (defaults to HEAD)
    #[arg(long)]
    to: Option<String>,
}

#[derive(Args, Debug)]
struct ReleasePrArgs {
    #[command(flatten)]
    history: HistoryArgs,

    /// Ref that triggered the run
    #[arg(long = "ref", env = "GITHUB_REF")]
    git_ref: Option<String>,

    /// Run even if the ref is neither `dev` nor a vX.Y.Z tag
    #[arg(long)]
    force: bool,

    /// Commit the release branch is built on (defaults to HEAD)
    #[arg(long, env = "GITHUB_SHA")]
    sha: Option<String>,

    /// Branch the PR targets (defaults to the triggering branch, else the
    /// repository's default branch)
    #[arg(long)]
    base: Option<String>,

    /// Repository as OWNER/REPO (defaults to GITHUB_REPOSITORY, then origin)
    #[arg(long)]
    repository: Option<String>,

    /// Branch the PR is opened from
    #[arg(long, default_value = github::release_pr::DEFAULT_RELEASE_BRANCH)]
    branch: String,

    /// Title of the PR
    #[arg(long, default_value = github::release_pr::DEFAULT_PR_TITLE)]
    title: String,

    /// Message of the release commit
    #[arg(long, default_value = github::release_pr::DEFAULT_COMMIT_MESSAGE)]
    commit_message: String,

    /// Step output name
    #[arg(long, default_value = "notes")]
    output_name: String,

    /// Stop before calling GitHub
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NotesFormat {
    /// One line, newlines escaped as `\n`
    Escaped,
    /// One subject per line
    Plain,
    /// JSON with prefix and line per entry
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(
        logging::level_from_flags(cli.quiet, cli.verbose),
        cli.color,
        cli.log_file.as_deref(),
    )
    .context("Failed to open log file")?;

    match cli.command {
        Command::Notes { history, format } => {
            let (_, notes) = load_notes(&history)?;
            print_notes(&notes, format)?;
        }
        Command::Output { history, name } => {
            let (_, notes) = load_notes(&history)?;
            StepOutput::from_env()
                .write(&name, &notes.escaped())
                .context("Failed to write step output")?;
        }
        Command::ReleasePr(args) => run_release_pr(args).await?,
        Command::Prune {
            base,
            repo,
            dry_run,
        } => run_prune(&base, &repo, dry_run)?,
    }

    Ok(())
}

/// Open the repository and extract notes from its history.
fn load_notes(args: &HistoryArgs) -> Result<(Repository, ReleaseNotes)> {
    let repo = git::open_repository(&args.repo)
        .context("Not a git repository. Run relnote from within a git repository.")?;

    let commits: Vec<Commit> =
        git::read_history_between(&repo, args.from.as_deref(), args.to.as_deref())
            .context("Failed to read commit history")?;
    debug!(count = commits.len(), "Read commit history");

    let notes = extract_notes(commits.iter().map(|c| c.subject.as_str()));
    info!(
        entries = notes.len(),
        commits = commits.len(),
        "Extracted release notes"
    );

    Ok((repo, notes))
}

fn print_notes(notes: &ReleaseNotes, format: NotesFormat) -> Result<()> {
    match format {
        NotesFormat::Escaped => println!("{}", notes.escaped()),
        NotesFormat::Plain => {
            for line in notes.lines() {
                println!("{}", line);
            }
        }
        NotesFormat::Json => {
            let json = serde_json::to_string_pretty(notes).context("Failed to serialize notes")?;
            println!("{}", json);
        }
    }
    Ok(())
}

async fn run_release_pr(args: ReleasePrArgs) -> Result<()> {
    // Step 1: Trigger check
    let trigger = match trigger::decide(args.git_ref.as_deref(), args.force) {
        Decision::Run { trigger } => trigger,
        Decision::Skip { .. } => return Ok(()),
    };

    // Step 2: Notes from history
    let (repo, notes) = load_notes(&args.history)?;
    if notes.is_empty() {
        info!("No conventional commits found, release notes are empty");
    }

    // Step 3: Step output
    StepOutput::from_env()
        .write(&args.output_name, &notes.escaped())
        .context("Failed to write step output")?;

    let base = trigger::base_branch(args.base.as_deref(), trigger.as_ref());

    if args.dry_run {
        let base = base.as_deref().unwrap_or("<default branch>");
        println!("--- Dry Run: {} -> {} ---\n", args.branch, base);
        println!("{}\n", args.title);
        println!("{}", notes.document());
        print_summary(&notes);
        return Ok(());
    }

    // Step 4: Release PR
    let slug = github::resolve_repository(args.repository.as_deref(), &repo)
        .context("Could not determine the GitHub repository")?;
    let head_sha = match args.sha {
        Some(sha) => sha,
        None => git::head_sha(&repo).context("Failed to resolve HEAD")?,
    };
    let token = github::get_github_token().context("GitHub authentication required")?;
    debug!(source = ?token.source, "Found GitHub token");
    let client =
        github::build_client(&token.token).context("Failed to build the GitHub client")?;

    let base = match base {
        Some(base) => base,
        None => github::default_branch_with_client(&client, &slug)
            .await
            .with_context(|| format!("Failed to look up the default branch of {}", slug))?,
    };

    let settings = ReleasePrSettings {
        branch: args.branch,
        title: args.title,
        commit_message: args.commit_message,
    };
    let body = notes.document();
    let request = ReleasePrRequest {
        slug: &slug,
        base: &base,
        head_sha: &head_sha,
        body: &body,
        settings: &settings,
    };

    let pr = github::open_release_pr_with_client(&client, &request)
        .await
        .with_context(|| format!("Failed to open release PR on {}", slug))?;

    let verb = match pr.action {
        github::PrAction::Created => "Opened",
        github::PrAction::Updated => "Updated",
    };
    println!("✓ {} release PR #{}: {}", verb, pr.number, pr.html_url);
    println!(
        "  {} -> {} at {}",
        settings.branch,
        base,
        short_sha(&pr.commit_sha)
    );
    print_summary(&notes);

    Ok(())
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

fn print_summary(notes: &ReleaseNotes) {
    let counts = notes.counts_by_prefix();
    if counts.is_empty() {
        println!("0 entries");
        return;
    }

    let parts: Vec<String> = counts
        .iter()
        .map(|(prefix, n)| format!("{} {}", n, prefix.as_str()))
        .collect();
    println!("{} entries ({})", notes.len(), parts.join(", "));
}

fn run_prune(base: &str, path: &std::path::Path, dry_run: bool) -> Result<()> {
    let repo = git::open_repository(path)
        .context("Not a git repository. Run relnote from within a git repository.")?;

    let merged = git::merged_branches(&repo, base)
        .with_context(|| format!("Failed to find branches merged into {}", base))?;

    if merged.is_empty() {
        println!("No branches merged into {}.", base);
        return Ok(());
    }

    for name in &merged {
        println!("{}", name);
    }

    if dry_run {
        println!("\n{} branch(es) would be deleted.", merged.len());
        return Ok(());
    }

    git::delete_branches(&repo, &merged).context("Failed to delete merged branches")?;
    println!("\n✓ Deleted {} branch(es).", merged.len());

    Ok(())
}
