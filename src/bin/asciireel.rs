use std::io::Write as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "asciireel", version, about = "Stream a movie as text frames over websockets")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Warm up the frame cache, then serve it until Ctrl-C.
    Serve(ConfigArgs),
    /// Build or verify the frame cache, then exit.
    Warm(ConfigArgs),
    /// Print a summary of a cache artifact.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the movie and its cache.
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Movie file name inside the resources directory.
    #[arg(long)]
    movie: Option<String>,

    /// Static files served at `/`.
    #[arg(long)]
    public: Option<PathBuf>,

    /// HTTP listen address.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Characters per rendered row.
    #[arg(long)]
    columns: Option<u32>,

    /// Frame export format: html, ansi or text.
    #[arg(long)]
    format: Option<asciireel::TextFormat>,

    /// Store frames uncompressed.
    #[arg(long)]
    no_gzip: bool,

    /// Requests buffered per session.
    #[arg(long)]
    queue_capacity: Option<usize>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Cache artifact to read.
    cache: PathBuf,

    /// Also write the payload of this frame to stdout.
    #[arg(long)]
    frame: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Warm(args) => cmd_warm(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: ConfigArgs) -> anyhow::Result<asciireel::ReelConfig> {
    let mut cfg = match &args.config {
        Some(path) => asciireel::ReelConfig::from_path(path)?,
        None => asciireel::ReelConfig::default(),
    };
    if let Some(v) = args.resources {
        cfg.resources_path = v;
    }
    if let Some(v) = args.movie {
        cfg.movie = v;
    }
    if let Some(v) = args.public {
        cfg.public_path = Some(v);
    }
    if let Some(v) = args.listen {
        cfg.listen = v;
    }
    if let Some(v) = args.columns {
        cfg.columns = v;
    }
    if let Some(v) = args.format {
        cfg.format = v;
    }
    if args.no_gzip {
        cfg.gzip = false;
    }
    if let Some(v) = args.queue_capacity {
        cfg.queue_capacity = v;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn warm_up(cfg: &asciireel::ReelConfig) -> anyhow::Result<asciireel::CacheStore> {
    let (store, report) = asciireel::WarmupOrchestrator::from_config(cfg)
        .run()
        .with_context(|| format!("warm up cache '{}'", cfg.cache_path().display()))?;
    tracing::debug!(?report, "warm-up report");
    Ok(store)
}

fn cmd_warm(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(args)?;
    let store = warm_up(&cfg)?;
    println!(
        "{}: {} frames, {} bytes",
        cfg.cache_path().display(),
        store.size(),
        store.total_bytes()
    );
    Ok(())
}

fn cmd_serve(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(args)?;
    let store = Arc::new(warm_up(&cfg)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(cfg.listen)
            .await
            .with_context(|| format!("bind {}", cfg.listen))?;
        let app = asciireel::router(
            store,
            cfg.public_path.as_deref(),
            asciireel::SessionOpts {
                queue_capacity: cfg.queue_capacity,
            },
        );
        asciireel::serve(listener, app, shutdown_signal()).await?;
        tracing::info!("server stopped");
        Ok(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("shutdown requested");
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let store = asciireel::load(&args.cache)
        .with_context(|| format!("load cache '{}'", args.cache.display()))?;
    let lock = asciireel::lock_path(&args.cache);

    match args.frame {
        None => {
            println!("artifact:    {}", args.cache.display());
            println!("frames:      {}", store.size());
            println!("total bytes: {}", store.total_bytes());
            if let Some(first) = store.frame(asciireel::FrameIndex(0)) {
                println!("first frame: {} bytes", first.len());
            }
            if lock.exists() {
                println!("lock marker: {} (warm-up in progress or stale)", lock.display());
            }
        }
        Some(idx) => {
            let frame = store
                .frame(asciireel::FrameIndex(idx))
                .with_context(|| format!("frame {idx} is out of range ({} frames)", store.size()))?;
            let mut out = std::io::stdout().lock();
            out.write_all(frame.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}
