use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;

use reelforge::{GenerationRequest, ReelConfig, ReelGenerator, SectionText};

#[derive(Parser, Debug)]
#[command(name = "reelforge", version)]
struct Cli {
    /// Increase log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the reel described by a job file (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Compose one section frame as a PNG.
    Frame(FrameArgs),
    /// Print per-section durations and frame counts without rendering.
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Job JSON file.
    #[arg(long)]
    job: PathBuf,

    /// Font file used for overlay text.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output directory for the final video and temporary files.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Copy the final video into this directory.
    #[arg(long)]
    publish_dir: Option<PathBuf>,

    /// Per-tool timeout in seconds (0 disables).
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the resolved font family and SHA-256 before rendering.
    #[arg(long, default_value_t = false)]
    dump_font: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Section index (0 = title).
    #[arg(long)]
    section: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print the resolved font family and SHA-256 before composing.
    #[arg(long, default_value_t = false)]
    dump_font: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    job: JobArgs,
}

/// On-disk job description.
#[derive(serde::Deserialize, Debug)]
struct JobFile {
    title: String,
    images: Vec<PathBuf>,
    texts: Vec<SectionText>,
    #[serde(default)]
    audio_dir: Option<PathBuf>,
    #[serde(default)]
    config: ReelConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_job(args: &JobArgs) -> anyhow::Result<(GenerationRequest, ReelConfig)> {
    let bytes = std::fs::read(&args.job)
        .with_context(|| format!("read job file '{}'", args.job.display()))?;
    let job: JobFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse job file '{}'", args.job.display()))?;
    let root = args.job.parent().unwrap_or_else(|| Path::new("."));

    let mut config = job.config;
    config.output_dir = resolve(root, &config.output_dir);
    config.font_path = args
        .font
        .clone()
        .or_else(|| config.font_path.as_deref().map(|p| resolve(root, p)));
    config.publish_dir = config.publish_dir.as_deref().map(|p| resolve(root, p));

    let mut request = GenerationRequest::new(
        job.title,
        job.images.iter().map(|p| resolve(root, p)).collect(),
        job.texts,
    );
    if let Some(dir) = job.audio_dir {
        request = request.with_audio_dir(resolve(root, &dir));
    }
    Ok((request, config))
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (request, mut config) = load_job(&args.job)?;
    if let Some(dir) = args.out_dir {
        config.output_dir = dir;
    }
    if let Some(dir) = args.publish_dir {
        config.publish_dir = Some(dir);
    }
    if let Some(secs) = args.timeout_secs {
        config.tool_timeout_secs = (secs > 0).then_some(secs);
    }
    if args.dump_font {
        dump_font(config.font_path.as_deref())?;
    }

    let mut generator = ReelGenerator::new(config)?;
    let report = generator.generate(&request)?;
    for s in report.fallback_sections() {
        eprintln!(
            "section {} used the fallback duration ({}s, clip {})",
            s.section.index,
            s.duration_secs,
            s.fallback.map(|r| r.to_string()).unwrap_or_default()
        );
    }
    if let Some(p) = &report.published_video {
        eprintln!("published {}", p.display());
    }
    println!("{}", report.final_video.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (request, config) = load_job(&args.job)?;
    if args.dump_font {
        dump_font(config.font_path.as_deref())?;
    }

    let mut generator = ReelGenerator::new(config)?;
    let frame = generator.preview_frame(&request, args.section)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let (request, config) = load_job(&args.job)?;
    let fps = config.frame_rate()?;
    let generator = ReelGenerator::new(config)?;
    let plans = generator.plan(&request)?;

    let mut total = 0u64;
    for p in &plans {
        total += p.frame_count;
        let fallback = match p.fallback {
            Some(reason) => format!(" (fallback: {reason})"),
            None => String::new(),
        };
        println!(
            "{}\t{:.3}s\t{} frames{fallback}\t{}",
            p.section.index,
            p.duration_secs,
            p.frame_count,
            p.section.audio.display()
        );
    }
    println!(
        "total\t{:.3}s\t{total} frames",
        fps.frames_to_secs(total)
    );
    Ok(())
}

fn dump_font(explicit: Option<&Path>) -> anyhow::Result<()> {
    let font = reelforge::text::font::resolve_font(explicit)?;
    let engine = reelforge::text::font::TextLayoutEngine::new(&font.bytes)?;
    eprintln!("font diagnostics:");
    eprintln!("  path:    {}", font.path.display());
    eprintln!("  family:  {}", engine.family_name());
    eprintln!("  sha256:  {}", sha256_hex(&font.bytes));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
