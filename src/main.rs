use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use voice_insights::{PipelineContext, cli, llm::LLMClient, server};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "voice_insights=debug,tower_http=debug"
    } else {
        "voice_insights=info,warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.verbose);
    let config = args.into_config()?;

    let llm_client = LLMClient::new(config.llm.clone())?;
    // 启动时检查模型连接
    if config.check_connection {
        llm_client.check_connection().await?;
    }

    let pipeline = PipelineContext::with_backend(config, Arc::new(llm_client))?;
    server::start_server(Arc::new(pipeline)).await
}
