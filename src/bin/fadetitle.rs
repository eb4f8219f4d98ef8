use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use fadetitle::encode::ffmpeg::is_tool_available;
use fadetitle::{
    ApiServer, CpuSurfaceFactory, FfmpegWebmEncoder, FfprobeVerifier, GcsStore, RenderPipeline,
    ServiceConfig,
};

#[derive(Parser, Debug)]
#[command(name = "fadetitle", version)]
struct Cli {
    /// Listen port (overrides `PORT`).
    #[arg(long)]
    port: Option<u16>,

    /// Font file (overrides `FADETITLE_FONT`).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Scratch directory root (overrides `FADETITLE_WORK_DIR`).
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Validate configuration, credentials and font, then exit.
    #[arg(long)]
    check_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut cfg = ServiceConfig::from_lookup(|k| {
        // `--font` satisfies the required font variable.
        match k {
            fadetitle::config::ENV_FONT if cli.font.is_some() => {
                cli.font.as_ref().map(|p| p.display().to_string())
            }
            _ => std::env::var(k).ok(),
        }
    })?;
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    if let Some(dir) = cli.work_dir {
        cfg.work_dir = dir;
    }
    tracing::debug!(?cfg, "configuration");

    let store = GcsStore::from_credentials_json(&cfg.credentials_json, cfg.bucket.clone())?;
    let surfaces = CpuSurfaceFactory::from_font_path(&cfg.font_path)?;
    std::fs::create_dir_all(&cfg.work_dir)
        .with_context(|| format!("create work directory '{}'", cfg.work_dir.display()))?;

    for tool in [&cfg.ffmpeg_bin, &cfg.ffprobe_bin] {
        if !is_tool_available(tool) {
            tracing::warn!(tool = %tool.display(), "tool not runnable; title renders will fail");
        }
    }

    if cli.check_config {
        tracing::info!(bucket = %cfg.bucket, "configuration ok");
        return Ok(());
    }

    let pipeline = RenderPipeline::new(
        Arc::new(surfaces),
        Arc::new(FfmpegWebmEncoder::new(&cfg.ffmpeg_bin)),
        Arc::new(FfprobeVerifier::new(&cfg.ffprobe_bin)),
        Arc::new(store),
        cfg.work_dir.clone(),
    );
    ApiServer::new(pipeline).run(cfg.port)
}
