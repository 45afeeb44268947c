#[tokio::main]
async fn main() -> std::io::Result<()> {
    game_client::run_with_config().await
}
