use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

use feednorm::config::Config;
use feednorm::feed::{parse_with, Feed, ParseOutcome};

/// Get the default config file path (~/.config/feednorm/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("feednorm")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(name = "feednorm", about = "Normalize an RSS 2.0 or Atom 1.0 feed document")]
struct Args {
    /// Feed document to read, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print the normalized feed as JSON
    #[arg(long)]
    json: bool,

    /// Config file (defaults to ~/.config/feednorm/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read feed from stdin")?;
        return Ok(bytes);
    }
    std::fs::read(path).with_context(|| format!("Failed to read feed file: {}", path.display()))
}

fn print_summary(feed: &Feed) {
    println!("Title:       {}", feed.title);
    if !feed.link.is_empty() {
        println!("Link:        {}", feed.link);
    }
    if !feed.author.is_empty() {
        println!("Author:      {}", feed.author);
    }
    if !feed.language.is_empty() {
        println!("Language:    {}", feed.language);
    }
    if !feed.categories.is_empty() {
        println!("Categories:  {}", feed.categories.join(", "));
    }
    println!("Next fetch:  {}", feed.refresh.to_rfc3339());
    println!("Items:       {} ({} unread)", feed.items.len(), feed.unread);

    for item in &feed.items {
        let date = if item.date_valid {
            item.date.format("%Y-%m-%d %H:%M").to_string()
        } else {
            "????-??-?? ??:??".to_string()
        };
        println!("  {date}  {}", item.title);
        for enclosure in &item.enclosures {
            println!("                    [{}] {}", enclosure.mime_type, enclosure.url);
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    let bytes = read_input(&args.input)?;
    let ParseOutcome { feed, diagnostics } = parse_with(&bytes, &config.parse_options())
        .with_context(|| format!("Failed to parse feed: {}", args.input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&feed).context("Failed to serialize feed")?;
        println!("{json}");
    } else {
        print_summary(&feed);
    }

    if config.show_diagnostics && !diagnostics.is_empty() {
        eprintln!();
        eprintln!("{} diagnostic(s):", diagnostics.len());
        for diagnostic in &diagnostics {
            eprintln!("  {diagnostic}");
        }
    }

    Ok(())
}
