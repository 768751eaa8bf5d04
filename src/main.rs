use anyhow::Result;
use bitmv::areas::repository::Repository;
use bitmv::artifacts::relocation::MoveOptions;
use bitmv::commands::plumbing::ls_files::LsFilesOptions;
use bitmv::commands::plumbing::update_index::UpdateIndexOptions;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status of commands that die, as with git
const FATAL_EXIT_CODE: u8 = 128;

#[derive(Parser)]
#[command(
    name = "bitmv",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Move or rename tracked files in a git repository",
    long_about = "This is a small git implementation centered on `mv`. \
    It moves files, directories and submodules in the working tree and the index, \
    honoring sparse checkouts, and ships just enough plumbing to set up repositories for it.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Add file contents to the index",
        long_about = "This command stores the content of the given files in the object database \
        and stages them. Directories are added recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files to add")]
        paths: Vec<String>,
    },
    #[command(
        name = "mv",
        about = "Move or rename a file, a directory, or a symlink",
        long_about = "This command moves <source>... to <destination>. With several sources, \
        or when the destination is an existing directory, every source is moved into it. \
        The index is updated after a successful move."
    )]
    Mv {
        #[arg(short, long, help = "Report the names of files as they are moved")]
        verbose: bool,
        #[arg(short = 'n', long, help = "Only show what would happen")]
        dry_run: bool,
        #[arg(short, long, help = "Force renaming even if the target exists")]
        force: bool,
        #[arg(short = 'k', help = "Skip move or rename actions which would lead to an error")]
        ignore_errors: bool,
        #[arg(long, help = "Allow updating entries outside of the sparse-checkout cone")]
        sparse: bool,
        #[arg(index = 1, num_args = 2.., required = true, help = "<source>... <destination>")]
        paths: Vec<String>,
    },
    #[command(
        name = "ls-files",
        about = "Show information about files in the index",
        long_about = "This command lists the paths tracked by the index, in index order."
    )]
    LsFiles {
        #[arg(short, long, help = "Show mode, object name and stage of every entry")]
        stage: bool,
        #[arg(short = 't', help = "Tag entries with their status: H for cached, S for skip-worktree")]
        tags: bool,
    },
    #[command(
        name = "update-index",
        about = "Register file contents in the working tree to the index",
        long_about = "This command edits index entries directly: it toggles the skip-worktree \
        bit and registers entries from object names without touching the working tree."
    )]
    UpdateIndex {
        #[arg(long, conflicts_with = "no_skip_worktree", help = "Mark the paths as skip-worktree")]
        skip_worktree: bool,
        #[arg(long, help = "Clear the skip-worktree bit of the paths")]
        no_skip_worktree: bool,
        #[arg(long, value_name = "MODE,OID,PATH", help = "Add the specified entry to the index")]
        cacheinfo: Vec<String>,
        #[arg(long, help = "Read index information from stdin")]
        index_info: bool,
        #[arg(index = 1, help = "The paths to update")]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("fatal: {err:#}");
            ExitCode::from(FATAL_EXIT_CODE)
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode> {
    let pwd = std::env::current_dir()?;

    match command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => pwd.join(path),
                None => pwd,
            };
            let mut repository =
                Repository::new(&path.to_string_lossy(), Box::new(std::io::stdout()))?;

            repository.init().await?;
        }
        Commands::Add { paths } => {
            let mut repository = Repository::discover(&pwd, Box::new(std::io::stdout()))?;

            repository.add(&paths).await?;
        }
        Commands::Mv {
            verbose,
            dry_run,
            force,
            ignore_errors,
            sparse,
            paths,
        } => {
            let mut repository = Repository::discover(&pwd, Box::new(std::io::stdout()))?;
            let options = MoveOptions {
                verbose,
                dry_run,
                force,
                ignore_errors,
                sparse,
            };

            let outcome = repository.mv(&paths, options).await?;
            tracing::debug!(?outcome, "mv finished");

            return Ok(ExitCode::from(outcome.exit_code()));
        }
        Commands::LsFiles { stage, tags } => {
            let mut repository = Repository::discover(&pwd, Box::new(std::io::stdout()))?;

            repository.ls_files(LsFilesOptions { stage, tags }).await?;
        }
        Commands::UpdateIndex {
            skip_worktree,
            no_skip_worktree,
            cacheinfo,
            index_info,
            paths,
        } => {
            let mut repository = Repository::discover(&pwd, Box::new(std::io::stdout()))?;
            let options = UpdateIndexOptions {
                skip_worktree: match (skip_worktree, no_skip_worktree) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                cacheinfo,
                index_info,
                paths,
            };

            repository
                .update_index(options, std::io::stdin().lock())
                .await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
