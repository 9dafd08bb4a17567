//! TCP-Listener – bindet den Socket und akzeptiert Verbindungen
//!
//! Der `RelaisServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen lokalen tokio-Task.
//!
//! ## Concurrency-Modell
//! Die Repository-Traits verwenden `async fn` ohne Send-Garantie
//! (async_fn_in_trait); alle Verbindungs-Tasks laufen deshalb in einer
//! `tokio::task::LocalSet` auf einem single-threaded Executor. Korrekt
//! fuer einen einzelnen Server-Prozess.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::LocalSet;

use deaddrop_db::repository::{BedrohungsRepository, GruppenRepository, KontoRepository};

use crate::connection::ClientVerbindung;
use crate::zustand::RelaisZustand;

/// TCP-Relais-Server
pub struct RelaisServer<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    state: Arc<RelaisZustand<K, G, B>>,
    bind_addr: SocketAddr,
}

impl<K, G, B> RelaisServer<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    /// Erstellt einen neuen RelaisServer
    pub fn neu(state: Arc<RelaisZustand<K, G, B>>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Bindet den Socket und akzeptiert Verbindungen bis zum Shutdown
    ///
    /// Verwendet eine eigene `LocalSet` fuer alle Verbindungs-Tasks.
    pub async fn starten(
        self,
        shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        let local = LocalSet::new();
        local
            .run_until(self.listener_bedienen(listener, shutdown_rx))
            .await
    }

    /// Accept-Loop auf einem bereits gebundenen Listener
    ///
    /// Muss innerhalb einer `LocalSet` laufen (Integrationstests binden den
    /// Listener selbst, um die Portnummer zu kennen).
    pub async fn listener_bedienen(
        self,
        listener: TcpListener,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let lokale_addr = listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "Relais-Server gestartet");

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let verbunden = self.state.register.anzahl() as u32;
                            if verbunden >= self.state.config.max_clients {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = self.state.config.max_clients,
                                    "Server voll – Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            }

                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

                            let verbindung = ClientVerbindung::neu(
                                Arc::clone(&self.state),
                                peer_addr,
                            );
                            let shutdown_rx_klon = shutdown_rx.clone();

                            // Lokaler Task – kein Send erforderlich
                            tokio::task::spawn_local(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_klon).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Relais-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("Relais-Server gestoppt");
        Ok(())
    }

    /// Gibt die konfigurierte Bind-Adresse zurueck
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
