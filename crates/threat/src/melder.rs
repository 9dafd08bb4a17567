//! Duress-Melder – Fire-and-forget Weg in die Threat-Senke
//!
//! Uebersetzt ein Duress-Signal (Credential-Treffer beim Login oder die
//! dedizierte Notfall-Geste eines Clients) in einen Vorfall fuer die
//! Kommandokonsole. Der Anhaenge-Aufruf laeuft auf einem losgeloesten Task:
//! er blockiert den Login-Pfad nie und hat keinen Fehlerkanal zum Aufrufer.
//! Ist die Senke nicht erreichbar, wird der Vorfall verworfen und nur
//! serverseitig geloggt – die Tarnung der Anmeldung hat Vorrang vor der
//! Zustellung des Alarms.

use std::sync::Arc;

use chrono::Utc;
use deaddrop_core::types::Kennung;
use deaddrop_db::{
    models::{BedrohungRecord, BedrohungsStatus},
    repository::BedrohungsRepository,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::art::BedrohungsArt;

/// Geokoordinaten einer Duress-Meldung
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoOrt {
    pub lat: f64,
    pub lon: f64,
}

/// Fire-and-forget Duress-Melder
///
/// Clone teilt die Senken-Referenz.
pub struct DuressMelder<B> {
    senke: Arc<B>,
}

impl<B> Clone for DuressMelder<B> {
    fn clone(&self) -> Self {
        Self {
            senke: Arc::clone(&self.senke),
        }
    }
}

impl<B: BedrohungsRepository + 'static> DuressMelder<B> {
    /// Erstellt einen neuen Melder auf der gegebenen Senke
    pub fn neu(senke: Arc<B>) -> Self {
        Self { senke }
    }

    /// Meldet ein Duress-Signal
    ///
    /// Kehrt sofort zurueck; das Anhaengen laeuft auf einem losgeloesten
    /// lokalen Task. Muss innerhalb einer `tokio::task::LocalSet`
    /// aufgerufen werden (wie alle Verbindungs-Tasks des Relays).
    pub fn melden(&self, kennung: Kennung, ort: Option<GeoOrt>) {
        let senke = Arc::clone(&self.senke);
        let vorfall = vorfall_bauen(&kennung, ort);

        tracing::warn!(
            kennung = %kennung,
            vorfall_id = %vorfall.id,
            "Duress-Signal ausgeloest"
        );

        tokio::task::spawn_local(async move {
            if let Err(e) = senke.anhaengen(vorfall).await {
                // Vorfall geht verloren; der Login-Pfad erfaehrt davon nichts
                tracing::error!(
                    kennung = %kennung,
                    fehler = %e,
                    "Duress-Vorfall konnte nicht angehaengt werden"
                );
            }
        });
    }
}

/// Baut den Vorfalls-Datensatz zu einem Duress-Signal
///
/// Koordinaten werden auf 4 Nachkommastellen formatiert; ohne Ortsangabe
/// steht der Marker `(location unavailable)` in den Details.
pub fn vorfall_bauen(kennung: &Kennung, ort: Option<GeoOrt>) -> BedrohungRecord {
    let orts_info = match ort {
        Some(o) => format!("at geo-coordinates {:.4}, {:.4}", o.lat, o.lon),
        None => "(location unavailable)".to_string(),
    };

    BedrohungRecord {
        id: Uuid::new_v4(),
        art: BedrohungsArt::Duress.als_tag().to_string(),
        quelle: "Operative Credential".to_string(),
        gemeldet_von: kennung.clone(),
        zeitpunkt: Utc::now(),
        status: BedrohungsStatus::Pending,
        details: format!(
            "Operative {kennung} has activated a duress protocol {orts_info}. \
             Immediate action required. Operative may be compromised."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deaddrop_db::MemoryStore;
    use tokio::task::LocalSet;

    #[test]
    fn vorfall_mit_koordinaten() {
        let vorfall = vorfall_bauen(
            &Kennung::neu("agent_zero"),
            Some(GeoOrt {
                lat: 52.520008,
                lon: 13.404954,
            }),
        );

        assert_eq!(vorfall.art, "duress");
        assert_eq!(vorfall.quelle, "Operative Credential");
        assert_eq!(vorfall.gemeldet_von.als_str(), "agent_zero");
        assert_eq!(vorfall.status, BedrohungsStatus::Pending);
        assert!(vorfall
            .details
            .contains("at geo-coordinates 52.5200, 13.4050"));
    }

    #[test]
    fn vorfall_ohne_ort_hat_marker() {
        let vorfall = vorfall_bauen(&Kennung::neu("spectre"), None);
        assert!(vorfall.details.contains("(location unavailable)"));
        assert!(vorfall.details.contains("Operative spectre"));
    }

    #[tokio::test]
    async fn melden_haengt_vorfall_an() {
        let store = Arc::new(MemoryStore::neu());
        let melder = DuressMelder::neu(Arc::clone(&store));

        let local = LocalSet::new();
        local
            .run_until(async {
                melder.melden(Kennung::neu("agent_zero"), None);
            })
            .await;
        // Restliche lokale Tasks (den Anhaenge-Task) abarbeiten
        local.await;

        let vorfaelle = store.liste().await.unwrap();
        assert_eq!(vorfaelle.len(), 1);
        assert_eq!(vorfaelle[0].gemeldet_von.als_str(), "agent_zero");
    }

    #[tokio::test]
    async fn doppelte_meldung_ergibt_zwei_vorfaelle() {
        let store = Arc::new(MemoryStore::neu());
        let melder = DuressMelder::neu(Arc::clone(&store));

        let local = LocalSet::new();
        local
            .run_until(async {
                melder.melden(Kennung::neu("agent_zero"), None);
                melder.melden(
                    Kennung::neu("agent_zero"),
                    Some(GeoOrt { lat: 0.0, lon: 0.0 }),
                );
            })
            .await;
        local.await;

        // Keine Deduplizierung – zwei Signale, zwei Vorfaelle
        let vorfaelle = store.liste().await.unwrap();
        assert_eq!(vorfaelle.len(), 2);
        assert_ne!(vorfaelle[0].id, vorfaelle[1].id);
    }
}
