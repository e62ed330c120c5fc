use anyhow::Context;
use blogsite::{api::HttpPostsApi, search::ControllerOptions, Config};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about = "Blog front-end for the posts REST API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Base URL of the posts API, overriding API_BASE_URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTML front-end (default)
    Serve {
        /// Port to listen on, overriding WEB_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Browse and search posts in the terminal
    Tui {
        /// Open the search view with this query
        #[arg(long)]
        search: Option<String>,
    },
}

fn init_tracing(default_filter: &str, to_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    if to_stderr {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve { port: None });

    match &command {
        Command::Serve { .. } => init_tracing("blogsite=debug,tower_http=debug", false),
        Command::Tui { .. } => init_tracing("blogsite=warn", true),
    }

    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }

    let api = Arc::new(HttpPostsApi::from_config(&config).context("building API client")?);

    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.web_port = port;
            }

            tracing::info!("Starting blogsite");
            tracing::info!("Posts API: {}", api.base_url());
            tracing::info!("Web server will listen on: {}", config.web_addr());

            let addr = config.web_addr();
            let state = blogsite::web::AppState::new(api, config);
            blogsite::web::serve(addr, state).await?;
        }
        Command::Tui { search } => {
            let options = if search.is_some() {
                ControllerOptions::search(&config)
            } else {
                ControllerOptions::browse(&config)
            };
            blogsite::tui::run(api, options, search).await?;
        }
    }

    Ok(())
}
