//! pigment - color conversion from the command line
//!
//! Parses CSS color text, converts between color spaces and ICC profiles,
//! checks gamuts and inspects installed profiles.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "pigment")]
#[command(author, version, about = "Color conversion and ICC profile tool")]
#[command(long_about = "
Parses CSS color text, converts colors between spaces and ICC profiles,
and inspects the profiles installed on this machine.

Examples:
  pigment parse 'hsl(0 100% 50%)' '#ff8000' --rgba
  pigment convert 'device-cmyk(0 0.2 0.2 0.2)' --to sRGB
  pigment convert 'oklch(0.7 0.35 150)' --to sRGB --map
  pigment convert red --profile press.icc --intent relative-colorimetric
  pigment gamut 'rgb(255 0 255)' --profile press.icc
  pigment profiles --output
  pigment profile press.icc --base64

Profile directories come from --config, --profile-dir and the
PIGMENT_PROFILE_DIRS environment variable.
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML file listing profile directories
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra profile directory (repeatable)
    #[arg(long = "profile-dir", global = true)]
    profile_dirs: Vec<PathBuf>,

    /// Also write log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse colors and show their space, values and canonical CSS
    #[command(visible_alias = "p")]
    Parse(ParseArgs),

    /// Convert a color into another space or an ICC profile
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Check whether a color fits a space or profile
    #[command(visible_alias = "g")]
    Gamut(GamutArgs),

    /// List installed ICC profiles
    Profiles(ProfilesArgs),

    /// Show information about one ICC profile
    Profile(ProfileArgs),
}

/// Arguments for the `parse` command.
#[derive(Args)]
struct ParseArgs {
    /// CSS color text
    #[arg(required = true)]
    colors: Vec<String>,

    /// Also print the sRGB value as #rrggbbaa
    #[arg(long)]
    rgba: bool,
}

/// Arguments for the `convert` command.
#[derive(Args)]
struct ConvertArgs {
    /// CSS color text
    color: String,

    /// Target space: a CSS color() name (srgb, xyz-d50...) or a space name (HSL, OkLch...)
    #[arg(short, long, required_unless_present = "profile", conflicts_with = "profile")]
    to: Option<String>,

    /// Target ICC profile: a file, or a profile name or ID from the profile directories
    #[arg(short, long)]
    profile: Option<String>,

    /// Rendering intent for profile conversions
    #[arg(short, long, default_value = "perceptual")]
    intent: String,

    /// Gamut map into the target space instead of converting as is
    #[arg(short, long)]
    map: bool,
}

/// Arguments for the `gamut` command.
#[derive(Args)]
struct GamutArgs {
    /// CSS color text
    color: String,

    /// Check channel ranges in this space
    #[arg(short, long, required_unless_present = "profile", conflicts_with = "profile")]
    to: Option<String>,

    /// Check reproducibility with this ICC profile (file, name or ID)
    #[arg(short, long)]
    profile: Option<String>,

    /// Tolerance for channel range checks
    #[arg(short, long, default_value = "0.0001")]
    epsilon: f64,
}

/// Arguments for the `profiles` command.
#[derive(Args)]
struct ProfilesArgs {
    /// Only monitor profiles
    #[arg(long, conflicts_with = "output")]
    display: bool,

    /// Only printer profiles
    #[arg(long)]
    output: bool,
}

/// Arguments for the `profile` command.
#[derive(Args)]
struct ProfileArgs {
    /// ICC profile file
    file: PathBuf,

    /// Print the profile as base64 instead
    #[arg(long)]
    base64: bool,
}

/// Where to look for installed profiles.
pub struct ProfileOptions {
    config: Option<PathBuf>,
    dirs: Vec<PathBuf>,
}

/// Installs the log subscriber. `RUST_LOG` wins over `-v`.
///
/// The returned guard flushes the log file and must live until exit.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr = fmt::layer().with_writer(std::io::stderr).without_time();

    let Some(path) = log_file else {
        tracing_subscriber::registry().with(filter).with(stderr).init();
        return Ok(None);
    };
    let name = path.file_name().with_context(|| format!("Bad log file: {}", path.display()))?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Ok(Some(guard))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;
    let profiles = ProfileOptions { config: cli.config, dirs: cli.profile_dirs };

    match cli.command {
        Commands::Parse(args) => commands::parse::run(args, cli.verbose),
        Commands::Convert(args) => commands::convert::run(args, &profiles),
        Commands::Gamut(args) => commands::gamut::run(args, &profiles),
        Commands::Profiles(args) => commands::profiles::run(args, &profiles, cli.verbose),
        Commands::Profile(args) => commands::profile::run(args),
    }
}
