//! TCP accept loop.
//!
//! Binds once, then accepts connections until the shutdown future resolves.
//! Every accepted connection is handed to a fresh [`Session`] running in its
//! own Tokio task, so a slow handshake or a busy session never delays the
//! next `accept()`.
//!
//! No cap is placed on concurrent sessions.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::domain::BridgeConfig;
use crate::infrastructure::session::Session;

/// A bound TCP listener plus the configuration every session will share.
pub struct Listener {
    inner: TcpListener,
    config: Arc<BridgeConfig>,
}

impl Listener {
    /// Binds `config.listen_host:config.listen_port`.
    ///
    /// Host names are resolved here, so `localhost` and IPv6 literals such as
    /// `::` both work.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved or bound (port in
    /// use, missing permission). This is the only fatal error in the bridge.
    pub async fn bind(config: BridgeConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let inner = TcpListener::bind((config.listen_host.as_str(), config.listen_port))
            .await
            .with_context(|| {
                format!(
                    "failed to bind TCP listener on {}:{}",
                    config.listen_host, config.listen_port
                )
            })?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// The address actually bound (useful when the configured port was `0`).
    ///
    /// # Errors
    ///
    /// Returns the OS error if the socket address cannot be queried.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Accept errors (e.g. too many open files) are logged and the loop keeps
    /// going. Sessions already running when `shutdown` fires are left to
    /// finish on their own.
    pub async fn serve<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested; stopping accept loop");
                    break;
                }
                accepted = self.inner.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!("{peer}: could not set TCP_NODELAY: {e}");
                        }
                        let session = Session::new(peer, Arc::clone(&self.config));
                        tokio::spawn(session.run(stream));
                    }
                    Err(e) => {
                        error!("accept error: {e}");
                    }
                },
            }
        }
    }
}

/// Binds the listener described by `config` and serves until `shutdown`.
///
/// # Errors
///
/// Returns an error only if binding fails.
pub async fn run_server<F>(config: BridgeConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let listener = Listener::bind(config).await?;
    let addr = listener.local_addr().context("failed to query listen address")?;

    info!(
        "Listening on {} port {} -> {}",
        addr.ip(),
        addr.port(),
        listener.config.target_url
    );

    listener.serve(shutdown).await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
