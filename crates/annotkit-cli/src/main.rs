use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use annotkit_core::DVec2;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use commands::PaintArgs;
use error::CliError;

/// `x,y` pair on the command line.
#[derive(Debug, Clone, Copy)]
struct CliPoint(DVec2);

impl FromStr for CliPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected x,y but got \"{s}\""))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| format!("invalid coordinate \"{v}\""))
        };
        Ok(CliPoint(DVec2::new(parse(x)?, parse(y)?)))
    }
}

#[derive(Parser)]
#[command(
    name = "annotkit",
    version,
    about = "Edit vector annotation documents",
    long_about = None
)]
struct Cli {
    /// Editor configuration (YAML, or JSON by extension)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a FeatureCollection and write it back in canonical form
    Normalize {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Paint or erase a brush stroke on a region feature
    Paint {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Index of the target feature
        #[arg(short, long)]
        feature: usize,
        /// Stroke points in model coordinates
        #[arg(
            short,
            long = "point",
            value_name = "X,Y",
            required = true,
            allow_hyphen_values = true
        )]
        points: Vec<CliPoint>,
        /// Brush radius in screen pixels
        #[arg(short, long)]
        radius: f64,
        #[arg(short, long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(short, long)]
        erase: bool,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Report the topmost feature under a point
    Hit {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "X,Y", allow_hyphen_values = true)]
        point: CliPoint,
        #[arg(short, long, default_value_t = 1.0)]
        zoom: f64,
    },
    /// Select features with a rubber band
    Select {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
        from: CliPoint,
        #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
        to: CliPoint,
        /// Only select features fully inside the band
        #[arg(long)]
        fully_contained: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Normalize { input, output } => {
            commands::run_normalize(&input, output.as_ref(), &config)
        }
        Command::Paint {
            input,
            feature,
            points,
            radius,
            zoom,
            erase,
            output,
        } => {
            let points: Vec<DVec2> = points.into_iter().map(|p| p.0).collect();
            let args = PaintArgs {
                input: &input,
                output: output.as_ref(),
                feature,
                points: &points,
                radius_px: radius,
                zoom,
                erase,
            };
            commands::run_paint(&args, &config)
        }
        Command::Hit { input, point, zoom } => commands::run_hit(&input, point.0, zoom, &config),
        Command::Select {
            input,
            from,
            to,
            fully_contained,
        } => commands::run_select(&input, from.0, to.0, fully_contained, &config),
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                error::ErrorCode::Usage.into()
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(code = ?err.code, "{err}");
            eprintln!("Error: {err}");
            err.code.into()
        }
    }
}
