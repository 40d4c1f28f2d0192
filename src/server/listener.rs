use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::config::Config;
use crate::http::connection::{Connection, ConnectionConfig};
use crate::reactor::{Interest, Reactor, Registry, Token};
use crate::transport::TcpSocket;

pub async fn run(cfg: &Config, app: Arc<dyn App>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", cfg.listen_addr);

    serve(listener, Arc::new(Registry::new()), app, cfg.connection()).await
}

/// Accepts forever, driving each connection on its own task.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<Registry>,
    app: Arc<dyn App>,
    config: ConnectionConfig,
) -> anyhow::Result<()> {
    let mut next_token = 0u64;

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };
        next_token += 1;
        debug!("Accepted connection from {}", peer);

        let conn = Connection::new(
            Token(next_token),
            TcpSocket::new(stream),
            Arc::clone(&registry),
            Arc::clone(&app),
            config,
        );
        tokio::spawn(drive(conn, Arc::clone(&registry)));
    }
}

/// Dispatches read readiness to the connection for as long as it stays
/// attached.
async fn drive(mut conn: Connection<TcpSocket, Registry>, registry: Arc<Registry>) {
    conn.start();

    while registry.is_attached(Interest::Read, conn.token()) && !conn.is_closed() {
        if let Err(e) = conn.socket().readable().await {
            debug!(cause = %e, "readiness wait failed");
            conn.close();
            break;
        }
        conn.on_readable();
    }

    // never leave a registration behind
    conn.close();
}
