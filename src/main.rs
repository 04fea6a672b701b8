use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use proxyhelper::providers::{self, ProviderKind};
use proxyhelper::{logging, ProxyHelper, Settings};
use std::path::PathBuf;
use std::process::ExitCode;

/// Fetch, verify and cache free HTTP proxies.
#[derive(Parser, Debug)]
#[command(name = "proxyhelper", version, about)]
struct Cli {
    /// Settings file; defaults apply when it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Do not log to the console
    #[arg(short, long)]
    quiet: bool,

    /// Do not write the log file
    #[arg(long)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every working proxy, one per line
    List {
        /// Ignore the cache and refresh now
        #[arg(short, long)]
        force: bool,
    },
    /// Print one random working proxy
    Get,
    /// Print the raw, unverified list of a single source
    Source {
        #[arg(value_enum)]
        source: SourceArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SourceArg {
    Proxyscrape,
    Scrapingant,
    Speedx,
}

impl From<SourceArg> for ProviderKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Proxyscrape => ProviderKind::ProxyScrape,
            SourceArg::Scrapingant => ProviderKind::ScrapingAnt,
            SourceArg::Speedx => ProviderKind::SpeedX,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if cli.quiet {
        settings.logging.console = false;
    }
    if cli.no_log_file {
        settings.logging.file = false;
    }

    match cli.command.unwrap_or(Command::List { force: false }) {
        Command::List { force } => {
            let mut helper = ProxyHelper::new(&settings)?;
            for proxy in helper.get_proxies(force).await?.iter() {
                println!("{}", proxy);
            }
        }
        Command::Get => {
            let mut helper = ProxyHelper::new(&settings)?;
            match helper.get_proxy().await? {
                Some(proxy) => println!("{}", proxy),
                None => {
                    eprintln!("no working proxy available");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Source { source } => {
            logging::init(&settings.logging)?;
            let kind = ProviderKind::from(source);
            let conf = kind.config(&settings.providers);
            let client = providers::new_client(settings.fetch_timeout())?;
            let provider = kind.build(conf.url.as_deref(), client);
            let candidates = provider
                .list()
                .await
                .with_context(|| format!("fetching {}", kind.name()))?;
            for candidate in candidates {
                println!("{}", candidate);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_list() {
        let cli = Cli::parse_from(["proxyhelper"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(!cli.quiet);
    }

    #[test]
    fn list_force_and_flags() {
        let cli = Cli::parse_from(["proxyhelper", "-q", "--no-log-file", "list", "--force"]);
        assert!(cli.quiet);
        assert!(cli.no_log_file);
        assert!(matches!(cli.command, Some(Command::List { force: true })));
    }

    #[test]
    fn source_names() {
        let cli = Cli::parse_from(["proxyhelper", "source", "scrapingant"]);
        match cli.command {
            Some(Command::Source { source }) => {
                assert_eq!(ProviderKind::from(source), ProviderKind::ScrapingAnt)
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
