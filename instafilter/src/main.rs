#[tokio::main]
async fn main() -> anyhow::Result<()> {
    extern crate instafilter;

    instafilter::desktop_main().await
}
