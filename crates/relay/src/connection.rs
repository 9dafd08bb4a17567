//! Client-Verbindung – verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientVerbindung` in einem eigenen
//! lokalen tokio-Task.
//!
//! ## Zustaende
//! ```text
//! Verbunden -> Authentifiziert -> Getrennt
//! ```
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping
//! - Kommt innerhalb von `verbindungs_timeout_sek` kein Frame an, wird
//!   die Verbindung getrennt
//!
//! Schreibzugriffe auf den Transport passieren ausschliesslich in dieser
//! Task; Zustellungen aus dem Register laufen ueber die Send-Queue. Damit
//! sind Schreibvorgaenge pro Verbindung serialisiert.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use deaddrop_db::repository::{BedrohungsRepository, GruppenRepository, KontoRepository};
use deaddrop_protocol::control::RelaisNachricht;
use deaddrop_protocol::wire::FrameCodec;

use crate::dispatcher::{DispatcherContext, RelaisDispatcher};
use crate::zustand::RelaisZustand;

/// Verarbeitet eine einzelne TCP-Verbindung
pub struct ClientVerbindung<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    state: Arc<RelaisZustand<K, G, B>>,
    peer_addr: SocketAddr,
}

impl<K, G, B> ClientVerbindung<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    /// Erstellt eine neue ClientVerbindung
    pub fn neu(state: Arc<RelaisZustand<K, G, B>>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder das Shutdown-Signal
    /// eingeht.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;
        let keepalive_intervall = Duration::from_secs(self.state.config.keepalive_sek);
        let timeout_dauer = Duration::from_secs(self.state.config.verbindungs_timeout_sek);

        tracing::info!(peer = %peer_addr, "Neue Verbindung");

        let mut framed = Framed::new(stream, FrameCodec::new());

        // Ausgehende Nachrichten (Register-Zustellungen -> Transport)
        let (sende_tx, mut sende_rx) = mpsc::channel::<RelaisNachricht>(64);

        let dispatcher = RelaisDispatcher::neu(Arc::clone(&self.state));
        let mut ctx = DispatcherContext {
            peer_addr,
            kennung: None,
        };

        let mut letzter_empfang = Instant::now();
        let mut naechster_ping = Instant::now() + keepalive_intervall;
        let mut ping_request_id: u32 = 0;
        let mut registriert = false;

        loop {
            let jetzt = Instant::now();

            if jetzt.duration_since(letzter_empfang) > timeout_dauer {
                tracing::warn!(peer = %peer_addr, "Verbindungs-Timeout");
                break;
            }

            let ping_verzoegerung = if jetzt < naechster_ping {
                naechster_ping.duration_since(jetzt)
            } else {
                Duration::from_millis(1)
            };

            tokio::select! {
                // Eingehende Nachricht vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(nachricht)) => {
                            letzter_empfang = Instant::now();
                            tracing::trace!(
                                peer = %peer_addr,
                                request_id = nachricht.request_id,
                                "Nachricht empfangen"
                            );

                            if let Some(antwort) = dispatcher.dispatch(nachricht, &mut ctx).await {
                                if let Err(e) = framed.send(antwort).await {
                                    tracing::warn!(peer = %peer_addr, fehler = %e, "Senden fehlgeschlagen");
                                    break;
                                }
                            }

                            // Nach erfolgreicher Authentifizierung: im Register
                            // eintragen und Zustellungen in die Send-Queue leiten
                            if !registriert {
                                if let Some(ref kennung) = ctx.kennung {
                                    let (mut empfang, vorherige) =
                                        self.state.register.registrieren(kennung.clone());
                                    // Der ersetzte Handle wird nicht geschlossen
                                    // (last-writer-wins); seine Task endet beim
                                    // naechsten Schreibfehler oder Remote-Close
                                    drop(vorherige);

                                    let sende_tx_klon = sende_tx.clone();
                                    tokio::task::spawn_local(async move {
                                        while let Some(zustellung) = empfang.recv().await {
                                            if sende_tx_klon.send(zustellung).await.is_err() {
                                                break;
                                            }
                                        }
                                    });
                                    registriert = true;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehende Zustellung aus dem Register
                Some(ausgehend) = sende_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(peer = %peer_addr, fehler = %e, "Zustellung fehlgeschlagen");
                        break;
                    }
                }

                // Keepalive-Ping
                _ = tokio::time::sleep(ping_verzoegerung) => {
                    if jetzt >= naechster_ping {
                        ping_request_id = ping_request_id.wrapping_add(1);
                        let ts = std::time::SystemTime::now()
                            .duration_since(std::time::UNIX_EPOCH)
                            .unwrap_or_default()
                            .as_millis() as u64;

                        if let Err(e) = framed.send(RelaisNachricht::ping(ping_request_id, ts)).await {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Ping fehlgeschlagen");
                            break;
                        }
                        naechster_ping = Instant::now() + keepalive_intervall;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Cleanup beim Verbindungsende
        if let Some(ref kennung) = ctx.kennung {
            dispatcher.verbindung_bereinigen(kennung);
        }

        tracing::info!(peer = %peer_addr, "Verbindungs-Task beendet");
    }
}
