//! Gemeinsamer Relais-Zustand
//!
//! Haelt alle geteilten Services als Arc-Referenzen, die sicher zwischen
//! den Verbindungs-Tasks geteilt werden koennen.

use std::sync::Arc;
use std::time::Instant;

use deaddrop_auth::AuthService;
use deaddrop_db::repository::{BedrohungsRepository, GruppenRepository, KontoRepository};
use deaddrop_threat::DuressMelder;

use crate::registry::VerbindungsRegister;
use crate::router::NachrichtenRouter;

/// Konfiguration fuer das Relais
#[derive(Debug, Clone)]
pub struct RelaisConfig {
    /// Anzeigename des Servers
    pub server_name: String,
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
}

impl Default for RelaisConfig {
    fn default() -> Self {
        Self {
            server_name: "Deaddrop Relay".to_string(),
            max_clients: 512,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
        }
    }
}

/// Gemeinsamer Relais-Zustand (thread-safe, Arc-geteilt)
pub struct RelaisZustand<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    /// Relais-Konfiguration
    pub config: Arc<RelaisConfig>,
    /// Auth-Engine (Login, Token-Validierung)
    pub auth: Arc<AuthService<K, B>>,
    /// Verbindungsregister (Kennung -> lebende Verbindung)
    pub register: VerbindungsRegister,
    /// Nachrichten-Router (Einzel- und Gruppen-Zustellung)
    pub router: NachrichtenRouter<G>,
    /// Duress-Melder fuer die dedizierte Notfall-Geste
    pub melder: DuressMelder<B>,
    /// Startzeitpunkt (fuer Uptime-Logs)
    pub start_zeit: Instant,
}

impl<K, G, B> RelaisZustand<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    /// Erstellt einen neuen Relais-Zustand
    pub fn neu(
        config: RelaisConfig,
        auth: Arc<AuthService<K, B>>,
        gruppen: Arc<G>,
        melder: DuressMelder<B>,
    ) -> Arc<Self> {
        let register = VerbindungsRegister::neu();
        let router = NachrichtenRouter::neu(register.clone(), gruppen);
        Arc::new(Self {
            config: Arc::new(config),
            auth,
            register,
            router,
            melder,
            start_zeit: Instant::now(),
        })
    }

    /// Uptime in Sekunden
    pub fn uptime_sek(&self) -> u64 {
        self.start_zeit.elapsed().as_secs()
    }
}
