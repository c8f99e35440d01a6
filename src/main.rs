use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{instrument, warn};

use wikigit::config::WikigitConfig;
use wikigit::render::RendererKind;
use wikigit::slug::{display_title, slugify};
use wikigit::{JsonlSource, ReplayOptions, ReplayOutcome, replay, replay_pipelined};

mod telemetry;

/// Replay a wiki's revision history into a git repository
///
/// Reads page revisions from a JSON Lines dump (one object per line with
/// `title`, `content`, `message`, `minor`, `author_name`, `author_email` and
/// `timestamp`) and writes one commit per revision. Each commit's tree holds
/// the rendered document of every page that exists at that point in history.
///
/// Settings are read from `wikigit.toml` in the current directory when
/// present. Flags override the file.
#[derive(Parser)]
#[command(name = "wikigit")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'wikigit <command> --help' for more information on a specific command.")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a revision dump into a repository
    ///
    /// The destination must be missing or empty unless --force (discard its
    /// contents) or --resume (continue its history) is given.
    Replay(ReplayArgs),

    /// Show the path key and display title for page titles
    Slug {
        /// Page titles
        #[arg(required = true)]
        titles: Vec<String>,
    },
}

#[derive(Args)]
struct ReplayArgs {
    /// JSON Lines revision dump
    input: PathBuf,

    /// Destination repository directory
    dest: PathBuf,

    /// Discard anything already at the destination
    #[arg(long, conflicts_with = "resume")]
    force: bool,

    /// Continue the history of an existing repository at the destination
    #[arg(long)]
    resume: bool,

    /// Replay at most this many revisions
    #[arg(long)]
    limit: Option<usize>,

    /// Skip this many revisions at the start of the dump
    #[arg(long, default_value_t = 0)]
    skip: usize,

    /// Markup dialect of the revisions [markdown, wikitext, passthrough]
    #[arg(long)]
    renderer: Option<RendererKind>,

    /// Create the repository without a working directory
    #[arg(long)]
    bare: bool,

    /// Render up to this many revisions ahead on a second thread (0 = off)
    #[arg(long, default_value_t = 0)]
    prefetch: usize,

    /// Configuration file [default: ./wikigit.toml if present]
    #[arg(long, env = "WIKIGIT_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init(cli.verbose);

    match cli.command {
        Commands::Replay(args) => run_replay(&args),
        Commands::Slug { titles } => {
            for title in &titles {
                println!("{}\t{}", slugify(title), display_title(title));
            }
            Ok(())
        }
    }
}

#[instrument(skip_all, fields(input = %args.input.display(), dest = %args.dest.display()))]
fn run_replay(args: &ReplayArgs) -> Result<()> {
    let config = WikigitConfig::load(args.config.as_deref())?;
    let mut settings = config.replay_settings()?;
    settings.bare |= args.bare;
    let renderer = args.renderer.unwrap_or(config.render.renderer).build();

    if !args.input.is_file() {
        bail!(
            "input {} is not a file\n  To fix: pass the path of a JSON Lines revision dump.",
            args.input.display()
        );
    }
    let source = JsonlSource::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?
        .skip(args.skip);

    // Ctrl-C stops the run after the revision in flight is committed.
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let options = ReplayOptions {
        force_overwrite: args.force,
        limit: args.limit,
        resume: args.resume,
        prefetch: args.prefetch,
        interrupt,
        settings,
    };

    let result = if args.prefetch > 0 {
        replay_pipelined(source, renderer.as_ref(), &args.dest, &options)
    } else {
        replay(source, renderer.as_ref(), &args.dest, &options)
    };
    let outcome =
        result.with_context(|| format!("replay into {} failed", args.dest.display()))?;

    report(&outcome, args.skip);
    Ok(())
}

fn report(outcome: &ReplayOutcome, skipped: usize) {
    for notice in &outcome.notices {
        println!("note: {notice}");
    }
    println!(
        "Replayed {} revision(s): {} commit(s), {} notice(s)",
        outcome.processed,
        outcome.chain.len(),
        outcome.notices.len()
    );
    if let Some(head) = outcome.head {
        println!("Head: {head}");
    }
    if outcome.interrupted {
        println!(
            "Interrupted. To continue: rerun with --resume --skip {}",
            skipped + outcome.processed
        );
    }
}
