/// Now Playing - headless host for the playback coordinator
use clap::{Parser, Subcommand};
use nowplaying_cli::{
    logging, render_snapshot, transport::HELP, CliConfig, HeadlessOutput, TransportCommand,
};
use nowplaying_client::PlaylistLoader;
use nowplaying_playback::{AudioDeviceAdapter, CoordinatorConfig, PlaybackCoordinator};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "nowplaying")]
#[command(about = "Headless Now Playing widget", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides configuration)
    #[arg(long)]
    base_url: Option<String>,

    /// Start with shuffle enabled
    #[arg(long)]
    shuffle: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the playlist and control playback from stdin
    Play,
    /// Print the playlist as JSON
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging()?;

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.base_url, cli.shuffle);
    config.validate()?;

    let loader = PlaylistLoader::from_config(&config.loader_config())?;
    tracing::info!(base = %loader.endpoint(), "Using backend");

    match cli.command {
        Commands::Play => play(&config, loader).await,
        Commands::List => list(&loader).await,
    }
}

async fn list(loader: &PlaylistLoader) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let playlist = tokio::select! {
        result = loader.load(&cancel) => result?,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&playlist)?);
    Ok(())
}

async fn play(config: &CliConfig, loader: PlaylistLoader) -> anyhow::Result<()> {
    let output = HeadlessOutput::new(config.simulated_track_length(), config.tick_interval());
    let adapter = AudioDeviceAdapter::new(Box::new(output));

    let (handle, task) = PlaybackCoordinator::spawn(
        adapter,
        Arc::new(loader),
        CoordinatorConfig::default().with_shuffle(config.playback.shuffle),
    )?;

    // Print every snapshot change
    let mut snapshots = handle.subscribe();
    let printer = tokio::spawn(async move {
        println!("{}", render_snapshot(&snapshots.borrow_and_update()));
        while snapshots.changed().await.is_ok() {
            println!("{}", render_snapshot(&snapshots.borrow_and_update()));
        }
    });

    handle.load()?;
    eprintln!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };

        // EOF or Ctrl-C
        let Some(line) = line else {
            break;
        };

        match line.parse::<TransportCommand>() {
            Ok(TransportCommand::Quit) => break,
            Ok(TransportCommand::Help) => eprintln!("{}", HELP),
            Ok(command) => command.apply(&handle)?,
            Err(e) => {
                if !line.trim().is_empty() {
                    eprintln!("{} ({})", e, HELP);
                }
            }
        }
    }

    handle.shutdown().await?;
    task.await?;
    printer.await?;

    Ok(())
}
