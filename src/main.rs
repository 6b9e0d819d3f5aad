use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use vendorcheck::{check, config::Config, runtime::RealRuntime};

/// vendorcheck - verify vendored libraries against their upstream sources
///
/// Every directory under the libraries root holds a `meta.txt` describing the
/// library's version, its GitHub repository or NuGet package, and the files
/// that must match upstream byte for byte.
///
/// Examples:
///   vendorcheck -v                      # Check ./libs, log each file
///   vendorcheck --libs-dir third_party  # Check another directory
#[derive(Parser, Debug)]
#[command(author, version = env!("VENDORCHECK_VERSION"), about)]
struct Cli {
    /// Verbose output (-v for progress, -vv for debug details)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory containing one subdirectory per vendored library
    #[arg(
        long = "libs-dir",
        env = "VENDORCHECK_LIBS_DIR",
        value_name = "PATH",
        default_value = "libs"
    )]
    libs_dir: PathBuf,

    /// Base URL for raw GitHub files (defaults to https://raw.githubusercontent.com)
    #[arg(long = "github-raw-url", value_name = "URL", hide = true)]
    github_raw_url: Option<String>,

    /// Base URL for NuGet packages (defaults to https://www.nuget.org)
    #[arg(long = "nuget-url", value_name = "URL", hide = true)]
    nuget_url: Option<String>,
}

fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Dependencies stay at warn; RUST_LOG still takes precedence.
    let filter = format!(
        "warn,vendorcheck={}",
        level_filter(cli.verbose).to_string().to_lowercase()
    );
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = Config::new(RealRuntime, cli.libs_dir, cli.github_raw_url, cli.nuget_url)?;
    check::run(config).await
}
