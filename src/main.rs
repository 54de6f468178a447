mod app;
mod clipboard;
mod commands;
mod config;
mod feedback;
mod history;
mod logging;
mod session;
mod setup;
mod ui;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
