//! Nachrichten-Router – Einzelzustellung und Gruppen-Fanout
//!
//! Zustellung ist fire-and-forget: kein Retry, keine Queue, keine
//! Offline-Zustellung. Ein nicht verbundener Empfaenger ist kein Fehler;
//! der Umschlag wird stillschweigend verworfen. Store-Fehler werden
//! geloggt und verworfen – der Router bringt weder die Verbindung noch
//! das Register zu Fall.

use std::collections::HashSet;
use std::sync::Arc;

use deaddrop_core::types::{GruppenId, Kennung};
use deaddrop_db::repository::GruppenRepository;
use deaddrop_protocol::control::{Envelope, RelaisNachricht};

use crate::registry::VerbindungsRegister;

/// Router fuer eingehende Nachrichten-Umschlaege
pub struct NachrichtenRouter<G> {
    register: VerbindungsRegister,
    gruppen: Arc<G>,
}

impl<G> Clone for NachrichtenRouter<G> {
    fn clone(&self) -> Self {
        Self {
            register: self.register.clone(),
            gruppen: Arc::clone(&self.gruppen),
        }
    }
}

impl<G: GruppenRepository> NachrichtenRouter<G> {
    /// Erstellt einen neuen Router
    pub fn neu(register: VerbindungsRegister, gruppen: Arc<G>) -> Self {
        Self { register, gruppen }
    }

    /// Stellt einen Umschlag zu und gibt die Anzahl eingereihter Kopien zurueck
    pub async fn route(&self, absender: &Kennung, umschlag: Envelope) -> usize {
        if umschlag.ist_gruppe {
            self.gruppe_zustellen(absender, umschlag).await
        } else {
            self.einzeln_zustellen(absender, umschlag)
        }
    }

    /// Einzelzustellung: Lookup + best-effort Senden
    fn einzeln_zustellen(&self, absender: &Kennung, umschlag: Envelope) -> usize {
        let ziel = Kennung::neu(umschlag.ziel.clone());
        match self.register.suche(&ziel) {
            Some(handle) => {
                let zustellung =
                    RelaisNachricht::zustellung(absender.als_str(), None, umschlag.nutzlast);
                usize::from(handle.senden(zustellung))
            }
            None => {
                // Empfaenger nicht verbunden: kein Fehler, keine Queue
                tracing::debug!(
                    absender = %absender,
                    ziel = %ziel,
                    "Zustellung ohne verbundenen Empfaenger verworfen"
                );
                0
            }
        }
    }

    /// Gruppen-Fanout: jedes Mitglied ausser dem Absender, je hoechstens
    /// eine Kopie, mit Gruppen-ID im Ausgang
    async fn gruppe_zustellen(&self, absender: &Kennung, umschlag: Envelope) -> usize {
        let gruppen_id = GruppenId::neu(umschlag.ziel.clone());

        let gruppe = match self.gruppen.aufloesen(&gruppen_id).await {
            Ok(Some(gruppe)) => gruppe,
            Ok(None) => {
                tracing::debug!(gruppe = %gruppen_id, "Unbekannte Gruppe – Umschlag verworfen");
                return 0;
            }
            Err(e) => {
                tracing::warn!(
                    gruppe = %gruppen_id,
                    fehler = %e,
                    "Gruppen-Verzeichnis nicht erreichbar – Umschlag verworfen"
                );
                return 0;
            }
        };

        // Mengen-Semantik: doppelte Verzeichniseintraege ergeben trotzdem
        // nur eine Kopie pro Mitglied
        let mitglieder: HashSet<&Kennung> = gruppe.mitglieder.iter().collect();

        let mut eingereiht = 0;
        for mitglied in mitglieder {
            if mitglied == absender {
                continue;
            }
            if let Some(handle) = self.register.suche(mitglied) {
                let zustellung = RelaisNachricht::zustellung(
                    absender.als_str(),
                    Some(gruppen_id.als_str().to_string()),
                    umschlag.nutzlast.clone(),
                );
                if handle.senden(zustellung) {
                    eingereiht += 1;
                }
            }
        }

        tracing::debug!(
            absender = %absender,
            gruppe = %gruppen_id,
            eingereiht,
            "Gruppen-Fanout abgeschlossen"
        );
        eingereiht
    }
}
