use anyhow::Result;
use markdown_preview::Config;
use markdown_preview::app::{init_logging, run};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config);
    run(config).await
}
