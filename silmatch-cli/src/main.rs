use clap::Parser;
use serde::{Deserialize, Serialize};
use silmatch::{Classifier, Config, CornerParams, DebugLevel, EdgeParams, Match};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify an image by silhouette corner matching")]
struct Cli {
    /// Directory with one subdirectory of example images per category.
    training_dir: Option<PathBuf>,
    /// Image to classify.
    candidate: Option<PathBuf>,
    /// Directory for cached corners and debug images.
    work_dir: Option<PathBuf>,
    /// JSON configuration file; command-line values take precedence.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Normalized silhouette size in pixels.
    #[arg(long)]
    size: Option<u32>,
    /// Border around the silhouette in pixels.
    #[arg(long)]
    border: Option<u32>,
    /// Match radius in pixels (defaults to size / 20).
    #[arg(long)]
    radius: Option<f32>,
    /// Debug image verbosity (0-3).
    #[arg(short, long)]
    debug: Option<u8>,
    /// Ignore cached corners and recompute them.
    #[arg(short, long)]
    refresh: bool,
    /// Number of ranked categories to report.
    #[arg(long)]
    top: Option<usize>,
    /// Print results as JSON.
    #[arg(long)]
    json: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EdgeParamsJson {
    kernel_radius: usize,
    kernel_width: f32,
}

impl Default for EdgeParamsJson {
    fn default() -> Self {
        let p = EdgeParams::default();
        Self {
            kernel_radius: p.kernel_radius,
            kernel_width: p.kernel_width,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CornerParamsJson {
    sensitivity: f32,
    contrast: f32,
    turn_angle_deg: f32,
    nms_radius: usize,
}

impl Default for CornerParamsJson {
    fn default() -> Self {
        let p = CornerParams::default();
        Self {
            sensitivity: p.sensitivity,
            contrast: p.contrast,
            turn_angle_deg: p.turn_angle_deg,
            nms_radius: p.nms_radius,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigJson {
    training_dir: Option<PathBuf>,
    candidate: Option<PathBuf>,
    work_dir: PathBuf,
    size: u32,
    border: u32,
    match_radius: Option<f32>,
    debug: u8,
    force_refresh: bool,
    top: usize,
    edge: EdgeParamsJson,
    corner: CornerParamsJson,
}

impl Default for ConfigJson {
    fn default() -> Self {
        let cfg = Config::default();
        Self {
            training_dir: None,
            candidate: None,
            work_dir: cfg.work_dir,
            size: cfg.size,
            border: cfg.border,
            match_radius: cfg.match_radius,
            debug: cfg.debug.level(),
            force_refresh: cfg.force_refresh,
            top: 1,
            edge: EdgeParamsJson::default(),
            corner: CornerParamsJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    category: String,
    closest: String,
    confidence: f32,
}

impl From<Match> for MatchRecord {
    fn from(value: Match) -> Self {
        Self {
            category: value.category,
            closest: value.example,
            confidence: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    best: Option<MatchRecord>,
    ranking: Vec<MatchRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("silmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let file_cfg: ConfigJson = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => ConfigJson::default(),
    };

    let training_dir = cli
        .training_dir
        .or(file_cfg.training_dir)
        .ok_or("a training directory is required")?;
    let candidate = cli
        .candidate
        .or(file_cfg.candidate)
        .ok_or("a candidate image is required")?;
    let top = cli.top.unwrap_or(file_cfg.top);
    if top == 0 {
        return Err("top must be at least 1".into());
    }

    let config = Config {
        size: cli.size.unwrap_or(file_cfg.size),
        border: cli.border.unwrap_or(file_cfg.border),
        match_radius: cli.radius.or(file_cfg.match_radius),
        debug: DebugLevel::from_level(cli.debug.unwrap_or(file_cfg.debug)),
        force_refresh: cli.refresh || file_cfg.force_refresh,
        edge: EdgeParams {
            kernel_radius: file_cfg.edge.kernel_radius,
            kernel_width: file_cfg.edge.kernel_width,
        },
        corner: CornerParams {
            sensitivity: file_cfg.corner.sensitivity,
            contrast: file_cfg.corner.contrast,
            turn_angle_deg: file_cfg.corner.turn_angle_deg,
            nms_radius: file_cfg.corner.nms_radius,
        },
        work_dir: cli.work_dir.unwrap_or(file_cfg.work_dir),
    };

    let classifier = Classifier::train(config, &training_dir)?;
    let ranking = classifier.rank(&candidate, top)?;
    let best = ranking.first().cloned();

    if cli.json {
        let output = Output {
            best: best.map(MatchRecord::from),
            ranking: ranking.into_iter().map(MatchRecord::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match best {
        Some(best) => {
            println!("{} {:.4}", best.category, best.score);
            println!("closest: {}", best.example);
            for entry in ranking.iter().skip(1) {
                println!("  {} {:.4} ({})", entry.category, entry.score, entry.example);
            }
        }
        None => println!("unclassified 0.0000"),
    }
    Ok(())
}
