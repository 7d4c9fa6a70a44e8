mod logging;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ov_core::render::FailureReason;
use ov_core::{keyed_articles, to_yaml, Dataset, DatasetEntry};
use ov_storage::DatasetStore;
use ov_web::ServerConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse OSINT article datasets", long_about = None)]
pub struct Cli {
    /// Directory holding the dataset files
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the viewer over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// List the available datasets
    List,
    /// Print the articles of one dataset, best match first
    Show {
        /// Dataset file name, e.g. ukraine.yaml
        filename: String,
        /// Include articles that failed, in stored order
        #[arg(long)]
        all: bool,
        /// Print the stored record as YAML
        #[arg(long, conflicts_with = "all")]
        raw: bool,
    },
}

fn format_listing(entries: &[DatasetEntry]) -> String {
    if entries.is_empty() {
        return "No data files found\n".to_string();
    }
    let mut out = format!("Available Data Files ({})\n", entries.len());
    for entry in entries {
        let meta = &entry.dataset.metadata;
        out.push_str(&format!(
            "  {}  {}\n    query: {}\n    processed: {}\n    {} articles, {} successful\n",
            entry.filename,
            entry.dataset.name,
            meta.query,
            meta.processed_at.long_date(),
            meta.total_articles,
            meta.successful,
        ));
    }
    out
}

fn format_dataset(dataset: &Dataset) -> String {
    let meta = &dataset.metadata;
    let mut out = format!(
        "{}\nQuery: {}\nTotal Articles: {}  Successful: {}\n",
        dataset.name, meta.query, meta.total_articles, meta.successful
    );
    if dataset.articles.is_empty() {
        out.push_str("\nNo articles found\n");
        return out;
    }
    for (key, article) in keyed_articles(dataset) {
        out.push_str(&format!(
            "\n{:>3}. [{:.2}] {}",
            key.index + 1,
            article.score(),
            article.original_title
        ));
        if let Some(rank) = article.rank() {
            out.push_str(&format!(" #{}", rank));
        }
        if let Some(source) = article.source() {
            out.push_str(&format!(" ({})", source));
        }
        out.push_str(&format!("\n     {}\n", article.url));
        match FailureReason::of(article) {
            Some(reason) => {
                out.push_str(&format!("     ! {}", reason.label()));
                if let Some(detail) = article.error_detail() {
                    out.push_str(&format!(": {}", detail));
                }
                out.push('\n');
            }
            None => {
                if let Some(summary) = article.payload().and_then(|p| p.summary()) {
                    out.push_str(&format!("     {}\n", summary));
                }
            }
        }
    }
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let store = DatasetStore::from_dir(&cli.data_dir);
    match cli.command {
        Commands::Serve { bind } => {
            info!("🚀 Starting viewer");
            ov_web::serve(ServerConfig {
                bind,
                data_dir: cli.data_dir,
            })
            .await?;
        }
        Commands::List => {
            print!("{}", format_listing(&store.list_datasets().await));
        }
        Commands::Show { filename, all, raw } => {
            let dataset = if all || raw {
                store.get_dataset(&filename).await
            } else {
                store.get_view(&filename).await
            }
            .with_context(|| format!("Could not load dataset {}", filename))?;

            if raw {
                print!("{}", to_yaml(&dataset)?);
            } else {
                print!("{}", format_dataset(&dataset));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ov_core::{derive_view, parse};

    const DATASET: &str = r#"
name: Port strikes
metadata:
  query: port strike europe
  processed_at: "2024-10-01"
  total_articles: 2
  successful: 1
articles:
  - url: https://example.com/a
    original_title: Strike spreads
    relevance_score: 6.5
    rank: 2
    crawl_success: true
    extraction_success: true
    article:
      source: Harbour Times
      summary: Workers walked out.
  - url: https://example.com/b
    original_title: Paywalled
    relevance_score: 8
    crawl_success: true
    extraction_success: false
    error: paywall detected
"#;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["ov", "show", "ports.yaml", "--all"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Show { ref filename, all: true, raw: false } if filename == "ports.yaml"
        ));
        assert_eq!(cli.data_dir, PathBuf::from("data"));

        let cli = Cli::try_parse_from(["ov", "--data-dir", "/srv/osint", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/srv/osint"));
        assert!(matches!(cli.command, Commands::Serve { bind } if bind.port() == 8080));

        assert!(Cli::try_parse_from(["ov", "show", "x.yaml", "--all", "--raw"]).is_err());
    }

    #[test]
    fn test_format_view() {
        let view = derive_view(&parse(DATASET).unwrap());
        let out = format_dataset(&view);
        assert!(out.starts_with("Port strikes\nQuery: port strike europe\nTotal Articles: 1  Successful: 1\n"));
        assert!(out.contains("  1. [6.50] Strike spreads #2 (Harbour Times)"));
        assert!(out.contains("Workers walked out."));
        assert!(!out.contains("Paywalled"));
    }

    #[test]
    fn test_format_all_articles() {
        let out = format_dataset(&parse(DATASET).unwrap());
        assert!(out.contains("  2. [8.00] Paywalled\n     https://example.com/b\n     ! Failed to extract content: paywall detected\n"));
    }

    #[test]
    fn test_format_listing() {
        assert_eq!(format_listing(&[]), "No data files found\n");
        let entry = DatasetEntry {
            filename: "ports.yaml".to_string(),
            dataset: parse(DATASET).unwrap(),
        };
        let out = format_listing(&[entry]);
        assert!(out.contains("ports.yaml  Port strikes"));
        assert!(out.contains("processed: October 1st, 2024"));
        assert!(out.contains("2 articles, 1 successful"));
    }
}
