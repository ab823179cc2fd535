#[tokio::main]
async fn main() -> anyhow::Result<()> {
    grimoire::cli::run().await
}
