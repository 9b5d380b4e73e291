use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    eventplan_cli::run_cli().await
}
