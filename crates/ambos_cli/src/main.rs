use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ambos_core::{AiGateway, Article, Config, Platform, SourceType};
use ambos_intel::{AnalysisOrchestrator, OpenRouterGateway, QueryEnricher};
use ambos_sources::{SearchQuery, SourceKind, SourceManager};
use ambos_web::{create_app, AlertDispatcher, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-source OSINT and press aggregation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Search the configured sources
    Search {
        query: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        /// Restrict to named sources (repeatable)
        #[arg(long = "source")]
        sources: Vec<String>,
        /// Emit raw JSON instead of a human listing
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a query for the given source type
    Enrich {
        query: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, value_enum, default_value = "news")]
        source_type: SourceType,
        /// Target platforms for OSINT enrichment (repeatable)
        #[arg(long = "platform", value_enum)]
        platforms: Vec<Platform>,
    },
    /// Search, then run an AI analysis over the results
    Analyze {
        query: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, value_enum, default_value = "news")]
        source_type: SourceType,
        #[arg(long = "source")]
        sources: Vec<String>,
    },
    /// List the sources available with the current credentials
    Sources,
}

fn build_gateway(config: &Config) -> anyhow::Result<Arc<dyn AiGateway>> {
    let key = config.require_gateway_key()?;
    Ok(Arc::new(OpenRouterGateway::new(
        key,
        config.openrouter_model.clone(),
    )))
}

fn selector(sources: &[String]) -> Option<&[String]> {
    if sources.is_empty() {
        None
    } else {
        Some(sources)
    }
}

fn print_articles(articles: &[Article]) {
    for article in articles {
        let credibility = article
            .osint
            .as_ref()
            .map(|o| format!(" [{} {}]", o.platform, o.credibility_score))
            .unwrap_or_default();
        println!(
            "{}  {}{}\n    {}\n    {}",
            article.published_at.format("%Y-%m-%d %H:%M"),
            article.source.name,
            credibility,
            article.title,
            article.url,
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let manager = SourceManager::from_config(&config);

    match cli.command {
        Commands::Serve { host, port } => {
            let gateway = match build_gateway(&config) {
                Ok(gateway) => Some(gateway),
                Err(_) => {
                    info!("🧠 no AI gateway key configured, enrich/analyze disabled");
                    None
                }
            };
            let state = AppState {
                manager: Arc::new(manager),
                gateway,
                layouts: ambos_store::create_store(config.data_dir.clone()),
                alerts: AlertDispatcher::new(),
            };
            let app = create_app(state);

            let host = host.unwrap_or(config.web_host);
            let port = port.unwrap_or(config.web_port);
            let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
            info!("🌐 listening on {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Commands::Search {
            query,
            language,
            limit,
            sources,
            json,
        } => {
            let search = SearchQuery::new(&query, &language).with_limit(limit);
            let articles = match sources.as_slice() {
                [single] => manager.fetch_one(single, &search).await?,
                rest => manager.search(&search, selector(rest)).await,
            };
            info!("✨ {} articles for {:?}", articles.len(), query);
            if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                print_articles(&articles);
            }
        }
        Commands::Enrich {
            query,
            language,
            source_type,
            platforms,
        } => {
            let enricher = QueryEnricher::new(build_gateway(&config)?);
            let enriched = enricher
                .enrich(&query, &language, source_type, &platforms)
                .await?;
            println!("{}", enriched.enriched_query);
        }
        Commands::Analyze {
            query,
            language,
            source_type,
            sources,
        } => {
            let gateway = build_gateway(&config)?;
            let search = SearchQuery::new(&query, &language);
            let articles = manager.search(&search, selector(&sources)).await;
            info!("🧠 analyzing {} articles", articles.len());

            let orchestrator = AnalysisOrchestrator::new(gateway);
            let result = orchestrator
                .analyze(&articles, &query, &language, source_type)
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Sources => {
            for info in manager.list() {
                let kind = match info.kind {
                    SourceKind::Press => "press",
                    SourceKind::Social => "social",
                    SourceKind::Feed => "feed",
                };
                println!("{:<12} {:<8} {}", info.cli_name, kind, info.name);
            }
        }
    }

    Ok(())
}
