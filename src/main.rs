//! # Media Compat - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento della configurazione e override dai flag
//! - Avvio della sessione e presentazione degli eventi (console o JSON)
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (comando, directory, tool, output)
//! 2. Configura il logging (`RUST_LOG`, altrimenti INFO o DEBUG con --verbose)
//! 3. Carica la configurazione e applica gli override
//! 4. Esegue il comando; Ctrl-C annulla la fase in corso
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-compat scan /path/to/movies
//! media-compat convert /path/to/movies --output /path/to/converted
//! media-compat transcode film.avi
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use media_compat::{
    json_output::{self, JsonMessage},
    platform,
    progress::{format_results_table, ConsoleReporter},
    video_processor::suggested_output_path,
    session::CatalogSummary,
    Config, SessionEvent, SessionOrchestrator, ToolPathResolver,
};

#[derive(Parser)]
#[command(name = "media-compat")]
#[command(about = "Check video codecs against TV playback support and re-encode what does not fit")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long, global = true)]
    ffprobe: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Print every event as a JSON line on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and report codec compatibility
    Scan {
        /// Directory containing video files
        directory: PathBuf,
    },
    /// Scan a directory and re-encode every incompatible file
    Convert {
        directory: PathBuf,

        /// Output directory (default: next to each source file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-encode a single file
    Transcode {
        input: PathBuf,

        /// Output file (default: <name>_converted.mp4 next to the input)
        output: Option<PathBuf>,
    },
    /// List the roots available for a full scan
    Roots,
    /// Show where ffprobe and ffmpeg were found
    Tools,
}

/// Where session events go
struct Presenter {
    console: Option<ConsoleReporter>,
    errors: usize,
    interrupted: bool,
}

impl Presenter {
    fn new(json: bool) -> Self {
        Self {
            console: (!json).then(ConsoleReporter::new),
            errors: 0,
            interrupted: false,
        }
    }

    fn handle(&mut self, event: &SessionEvent) {
        if matches!(
            event,
            SessionEvent::ScanError { .. }
                | SessionEvent::AnalysisError { .. }
                | SessionEvent::BatchError { .. }
        ) {
            self.errors += 1;
        }
        match &mut self.console {
            Some(reporter) => reporter.handle(event),
            None => json_output::emit_event(event),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&args).await?;
    let result = run(args.command, config).await;

    if let Err(e) = &result {
        if args.json {
            JsonMessage::error(e.to_string(), e.chain().nth(1).map(|s| s.to_string())).emit();
        }
    }
    result
}

async fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::from_file(&path).await?,
        None => Config::default(),
    };

    if args.ffprobe.is_some() {
        config.ffprobe_path = args.ffprobe.clone();
    }
    if args.ffmpeg.is_some() {
        config.ffmpeg_path = args.ffmpeg.clone();
    }
    if let Command::Convert { output: Some(output), .. } = &args.command {
        config.output_path = Some(output.clone());
    }
    config.json_output |= args.json;

    config.validate()?;
    Ok(config)
}

async fn run(command: Command, config: Config) -> Result<()> {
    let config = Arc::new(config);
    let tools = Arc::new(ToolPathResolver::new(&config));

    match command {
        Command::Roots => {
            let roots = platform::available_scan_roots();
            if config.json_output {
                JsonMessage::Roots { roots }.emit();
            } else {
                for root in roots {
                    println!("{}", root.display());
                }
            }
            Ok(())
        }
        Command::Tools => {
            if config.json_output {
                JsonMessage::Tools {
                    ffprobe: tools.ffprobe().await.ok(),
                    ffmpeg: tools.ffmpeg().await.ok(),
                }
                .emit();
            } else {
                print!("{}", tools.tools_report().await);
            }
            Ok(())
        }
        Command::Scan { directory } => {
            check_directory(&directory)?;
            run_session(config, tools, "scan", directory, false).await
        }
        Command::Convert { directory, .. } => {
            check_directory(&directory)?;
            run_session(config, tools, "convert", directory, true).await
        }
        Command::Transcode { input, output } => {
            if !input.is_file() {
                bail!("Input file does not exist: {}", input.display());
            }
            let output = output.unwrap_or_else(|| suggested_output_path(&input));
            let (session, mut rx, mut presenter) = open_session(config.clone(), tools);
            if config.json_output {
                JsonMessage::start("transcode", input.clone(), &config).emit();
            }

            let handle = session.transcode_single(input, output);
            let success = pump(&session, &mut rx, &mut presenter, handle).await?;
            if !success {
                bail!("Conversion failed");
            }
            Ok(())
        }
    }
}

fn check_directory(directory: &Path) -> Result<()> {
    if !directory.is_dir() {
        bail!("Media directory does not exist: {}", directory.display());
    }
    Ok(())
}

fn open_session(
    config: Arc<Config>,
    tools: Arc<ToolPathResolver>,
) -> (SessionOrchestrator, mpsc::Receiver<SessionEvent>, Presenter) {
    let (tx, rx) = mpsc::channel(config.event_buffer);
    let presenter = Presenter::new(config.json_output);
    (SessionOrchestrator::new(config, tools, tx), rx, presenter)
}

async fn run_session(
    config: Arc<Config>,
    tools: Arc<ToolPathResolver>,
    command: &str,
    directory: PathBuf,
    convert: bool,
) -> Result<()> {
    let (session, mut rx, mut presenter) = open_session(config.clone(), tools);
    if config.json_output {
        JsonMessage::start(command, directory.clone(), &config).emit();
    }

    let handle = session.start_scan(&directory).await?;
    pump(&session, &mut rx, &mut presenter, handle).await?;
    report_results(&session, &presenter).await;

    if convert && presenter.errors == 0 && !presenter.interrupted {
        match session.batch_convert(None).await? {
            Some(handle) => pump(&session, &mut rx, &mut presenter, handle).await?,
            None => info!("✅ Nothing to convert, every file is compatible"),
        }
        if let Some(reporter) = &presenter.console {
            for name in reporter.failed_files() {
                warn!("Conversion failed: {}", name);
            }
        }
    }

    if presenter.errors > 0 {
        if let Some(reporter) = &presenter.console {
            if let Some(last) = reporter.errors().last() {
                bail!("{} phase(s) ended with an error, last: {}", presenter.errors, last);
            }
        }
        bail!("{} phase(s) ended with an error", presenter.errors);
    }
    Ok(())
}

async fn report_results(session: &SessionOrchestrator, presenter: &Presenter) {
    let entries = session.catalog_snapshot().await;
    if presenter.console.is_some() {
        if !entries.is_empty() {
            println!("\n{}", format_results_table(&entries));
        }
    } else {
        let summary = CatalogSummary::from_entries(&entries);
        JsonMessage::results(entries, summary).emit();
    }
}

/// Forward events until the phase task ends; Ctrl-C cancels the phase
async fn pump<T>(
    session: &SessionOrchestrator,
    rx: &mut mpsc::Receiver<SessionEvent>,
    presenter: &mut Presenter,
    mut handle: JoinHandle<T>,
) -> Result<T> {
    let result = loop {
        tokio::select! {
            Some(event) = rx.recv() => presenter.handle(&event),
            result = &mut handle => break result?,
            _ = tokio::signal::ctrl_c() => {
                warn!("⏹ Interrupted, stopping after the current file");
                presenter.interrupted = true;
                session.cancel();
            }
        }
    };

    while let Ok(event) = rx.try_recv() {
        presenter.handle(&event);
    }
    Ok(result)
}
