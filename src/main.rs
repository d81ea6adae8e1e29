#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = coursehub::run().await {
        eprintln!("coursehub fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
