use std::sync::Arc;

use tideway::app::{App, AppResponse};
use tideway::config::Config;
use tideway::http::env::Env;
use tideway::http::headers::Headers;
use tideway::server;

fn hello(env: &Env) -> anyhow::Result<Option<AppResponse>> {
    let mut headers = Headers::new();
    headers.insert("Content-Type", "text/plain");

    let body = format!("Hello from Tideway: {} {}\n", env.method(), env.path());
    Ok(Some(AppResponse::new(200, headers, body)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.level()?)
        .init();

    let app: Arc<dyn App> = Arc::new(hello);

    tokio::select! {
        res = server::listener::run(&cfg, app) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
