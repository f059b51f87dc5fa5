use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tabtrail_cli::cli::app::run().await
}
