use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    swell_rewards_proxy_lib::run()
        .await
        .context("swell rewards proxy exited with an error")
}
