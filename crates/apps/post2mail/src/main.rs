//! post2mail - mirror a Hacker News thread into a Maildir
//!
//! Usage: `post2mail [OPTIONS] <url|dir>`

use anyhow::{Result, bail};
use clap::Parser;
use log::{debug, warn};
use std::path::PathBuf;
use std::process::ExitCode;

use threadmail::mirror::{self, MirrorOptions};
use threadmail::{ItemCache, Session, Settings, Snapshot, SyncOptions};

#[derive(Parser)]
#[command(name = "post2mail")]
#[command(about = "Mirror a Hacker News thread into a Maildir, one mail per post")]
#[command(version)]
struct Cli {
    /// Thread URL, or a directory mirrored by an earlier run
    target: Option<String>,

    /// Save mails into the given directory instead of one named after the post
    #[arg(short = 'o', value_name = "DIR")]
    output: Option<PathBuf>,

    /// Fetch the given url only and dump the response; do not fetch its children
    #[arg(long)]
    dump: bool,

    /// Read posts from a snapshot file instead of querying the API (mainly used for testing)
    #[arg(long, value_name = "FILE")]
    readfrom: Option<PathBuf>,

    /// Verbose
    #[arg(short, long)]
    verbose: bool,

    /// Be quiet
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings: {:#}", e);
            if let Some(path) = Settings::default_settings_path() {
                warn!(
                    "Using built-in defaults. Fix or remove {} to configure post2mail.",
                    path.display()
                );
            }
            Settings::default()
        }
    };
    debug!("settings: {:?}", settings);

    let (arg, cache) = match &cli.readfrom {
        Some(path) => {
            if !path.exists() {
                bail!("readfrom: file {} does not exist", path.display());
            }
            let snapshot = Snapshot::load(path)?;
            (snapshot.url.clone(), ItemCache::from(snapshot))
        }
        None => match &cli.target {
            Some(target) => (target.clone(), ItemCache::new()),
            None => bail!("Usage: post2mail <url|dir>"),
        },
    };

    let mut session = Session::with_cache(settings.client(), cache);

    if cli.dump {
        let url = mirror::resolve_url(&arg)?;
        println!("{}", mirror::dump(&mut session, &url)?);
        return Ok(());
    }

    let options = MirrorOptions {
        output_dir: cli.output.clone(),
        sync: SyncOptions {
            recipient: settings.recipient.clone(),
        },
        ..Default::default()
    };

    let quiet = cli.quiet;
    let report = mirror::run(&mut session, &arg, &options, |depth, outcome| {
        if !quiet {
            println!("{}{}", " ".repeat(depth), outcome.marker());
        }
    })?;

    if report.stats.fetch_errors > 0 {
        warn!("{} replies could not be fetched", report.stats.fetch_errors);
    }
    println!("{}", report.post_dir.display());
    Ok(())
}
