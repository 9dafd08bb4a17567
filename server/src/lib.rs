//! deaddrop-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und verdrahtet Store, Auth-Engine und
//! Relais zu einem lauffaehigen Prozess.

pub mod config;
pub mod seed;

use std::sync::Arc;

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use deaddrop_auth::{AuthService, DuressVergabe, SitzungsPraeger};
use deaddrop_db::MemoryStore;
use deaddrop_relay::{RelaisConfig, RelaisServer, RelaisZustand};
use deaddrop_threat::DuressMelder;

use config::ServerConfig;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. In-Memory-Store aufbauen (und optional Fixtures laden)
    /// 2. Auth-Engine und Duress-Melder verdrahten
    /// 3. Relais-Listener starten
    /// 4. Auf Ctrl-C warten, dann Shutdown propagieren
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            relais = %self.config.tcp_bind_adresse(),
            "Server startet"
        );

        let store = Arc::new(MemoryStore::neu());
        if self.config.server.seed_fixtures {
            seed::fixtures_laden(&store).await?;
        }

        let praeger = Arc::new(match &self.config.auth.token_schluessel {
            Some(kodiert) => {
                let schluessel = STANDARD
                    .decode(kodiert)
                    .map_err(|e| anyhow::anyhow!("token_schluessel ist kein base64: {e}"))?;
                SitzungsPraeger::neu(schluessel, self.config.auth.session_ttl_min)
            }
            None => {
                tracing::warn!(
                    "Kein token_schluessel konfiguriert – Tokens verlieren beim \
                     Neustart ihre Gueltigkeit"
                );
                SitzungsPraeger::mit_zufallsschluessel(self.config.auth.session_ttl_min)
            }
        });

        let vergabe = Arc::new(DuressVergabe::neu());
        let melder = DuressMelder::neu(Arc::clone(&store));
        let auth = Arc::new(AuthService::neu(
            Arc::clone(&store),
            praeger,
            vergabe,
            melder.clone(),
        ));

        let relais_config = RelaisConfig {
            server_name: self.config.server.name.clone(),
            max_clients: self.config.server.max_clients,
            keepalive_sek: self.config.netzwerk.keepalive_sek,
            verbindungs_timeout_sek: self.config.netzwerk.verbindungs_timeout_sek,
        };
        let zustand = RelaisZustand::neu(relais_config, auth, Arc::clone(&store), melder);

        let bind_addr: std::net::SocketAddr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .map_err(|e| anyhow::anyhow!("Ungueltige Bind-Adresse: {e}"))?;
        let relais = RelaisServer::neu(zustand, bind_addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = shutdown_tx.send(true);
            }
        });

        relais.starten(shutdown_rx).await?;
        tracing::info!("Server beendet");
        Ok(())
    }
}
