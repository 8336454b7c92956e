#[tokio::main]
async fn main() -> anyhow::Result<()> {
    locker_app::run().await
}
