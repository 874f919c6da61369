use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use linkhub::settings::Settings;
use linkhub::{convert, fetch_template, TargetFormat};

/// Convert proxy share links and subscriptions into client configurations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File with one entry per line (share link or subscription URL)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Output format: links, singbox or clash
    #[arg(short, long, default_value = "clash")]
    format: TargetFormat,

    /// Template URL or local file path; defaults to the built-in template
    #[arg(short, long, value_name = "URL_OR_FILE")]
    template: Option<String>,

    /// Output file; prints to stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Drop PROCESS-NAME rules for Apple clients
    #[arg(long)]
    apple: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();
    let mut settings = Settings::from_env();
    settings.apple_platform = args.apple;

    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input file {}", args.input.display()))?;
    let entries: Vec<String> = input
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let template = match args.format {
        // The link list needs no grouping template.
        TargetFormat::Links => String::new(),
        _ => load_template(args.template.as_deref(), &settings).await?,
    };

    let output = convert(&entries, &template, args.format, &settings).await?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write output file {}", path.display()))?;
            info!("Wrote {} bytes to {}", output.len(), path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// Load the template from a URL, a local file, or the configured default.
async fn load_template(source: Option<&str>, settings: &Settings) -> anyhow::Result<String> {
    match source {
        Some(source) if source.starts_with("http://") || source.starts_with("https://") => {
            Ok(fetch_template(source, settings).await?)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template file {}", path)),
        None => Ok(fetch_template(&settings.default_template_url, settings).await?),
    }
}
