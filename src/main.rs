use aleph_alpha_proxy::core::models::{AppConfig, EmbeddingMode};
use aleph_alpha_proxy::core::storage::ConfigStorage;
use aleph_alpha_proxy::web::WebServer;
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; flags and environment variables override it
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    #[arg(long, env = "BIND_ADDRESS")]
    bind: Option<String>,

    /// Backend base URL
    #[arg(long, env = "ALEPH_ALPHA_API_BASE")]
    backend_base_url: Option<String>,

    /// Server-held backend token; when set, client credentials are not forwarded
    #[arg(long, env = "AA_TOKEN", hide_env_values = true)]
    backend_token: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Use semantic embeddings instead of last-token pooling
    #[arg(long, env = "USE_SEMANTIC_EMBEDDINGS", value_parser = BoolishValueParser::new())]
    semantic_embeddings: Option<bool>,

    /// Chat model used when a request does not name one
    #[arg(long, env = "AA_CHAT_MODEL")]
    chat_model: Option<String>,

    /// Submit backend requests with lower priority
    #[arg(long, env = "AA_NICE", value_parser = BoolishValueParser::new())]
    nice: Option<bool>,
}

impl Args {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(url) = self.backend_base_url {
            config.proxy.backend_base_url = url;
        }
        if let Some(token) = self.backend_token {
            config.proxy.backend_token = Some(token);
        }
        if let Some(timeout) = self.request_timeout {
            config.proxy.request_timeout = timeout;
        }
        if let Some(semantic) = self.semantic_embeddings {
            config.proxy.embedding_mode = if semantic {
                EmbeddingMode::Semantic
            } else {
                EmbeddingMode::Regular
            };
        }
        if let Some(model) = self.chat_model {
            config.proxy.default_chat_model = Some(model);
        }
        if let Some(nice) = self.nice {
            config.proxy.nice = nice;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = ConfigStorage::load(args.config.as_deref())?;
    let config = ConfigStorage::validate(args.apply(config))?;

    let server = WebServer::new(config)?;
    server.run().await
}
