use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use uri_router::config::{load_config, ConfigError, DYNAMIC_HOST};
use uri_router::routing::{RequestDescriptor, Router};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Offline tooling for URI routing configurations", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "routing.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and report every problem
    Check,
    /// Resolve an absolute URL and print the result as JSON
    Resolve {
        url: String,
    },
    /// Build a URL the way templates and redirects do
    Url {
        /// Host of the request the URL is built for
        #[arg(long)]
        host: String,
        segments: Vec<String>,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
        #[arg(long)]
        secure: bool,
        #[arg(long, default_value = DYNAMIC_HOST)]
        variant: String,
        #[arg(long)]
        trailing: bool,
    },
    /// Print the common URLs rendered for a request URL
    CommonUrls {
        url: String,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("{}: {} problem(s)", cli.config.display(), errors.len());
            for error in errors {
                eprintln!("  - {error}");
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    let router = Router::from_config(config)?;

    match cli.command {
        Commands::Check => {
            println!("{}: ok", cli.config.display());
        }
        Commands::Resolve { url } => {
            let request = RequestDescriptor::from_url(&url)?;
            let result = router.resolve(&request);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Url {
            host,
            segments,
            query,
            secure,
            variant,
            trailing,
        } => {
            let request = RequestDescriptor::new(&host, "/", None, secure);
            let query: BTreeMap<String, String> = query.into_iter().collect();
            println!(
                "{}",
                router.build_url(&request, &segments, &query, secure, &variant, trailing)
            );
        }
        Commands::CommonUrls { url } => {
            let request = RequestDescriptor::from_url(&url)?;
            println!("{}", serde_json::to_string_pretty(&router.common_urls(&request))?);
        }
    }

    Ok(())
}
