use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use grs::app::App;
use grs::config::Config;

/// Default config file: `$XDG_CONFIG_HOME/grs`, else `~/.config/grs`.
fn get_config_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir).join("grs"));
    }
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("grs"))
}

#[derive(Parser, Debug)]
#[command(name = "grs", version, about = "Minimal two-pane terminal RSS/Atom reader")]
struct Args {
    /// Config file to read instead of ~/.config/grs
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the alternate screen;
    // silent unless RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if config.feeds.is_empty() {
        eprintln!("Warning: No feeds configured in {}", config_path.display());
        eprintln!("Add a section per feed, for example:");
        eprintln!();
        eprintln!("  [Planet Rust]");
        eprintln!("  url = https://planet.rust-lang.org/rss20.xml");
    } else {
        println!(
            "Fetching {} feeds from {}",
            config.feeds.len(),
            config_path.display()
        );
    }

    let mut app = App::load(&config).await?;

    grs::ui::run(&mut app, config.timer).await?;

    Ok(())
}
