//! Verbindungsregister – Kennung -> lebende Transport-Verbindung
//!
//! Eine injizierte, lock-geschuetzte Tabelle statt eines prozessweiten
//! Singletons, damit mehrere Test-Instanzen keinen Zustand teilen. Pro
//! Kennung existiert hoechstens ein Eintrag; eine neue Verbindung ersetzt
//! die alte (last-writer-wins). Das Register schliesst ersetzte
//! Verbindungen nie selbst – `registrieren` gibt den vorherigen Handle
//! zurueck, der Aufrufer entscheidet.

use dashmap::DashMap;
use deaddrop_core::types::Kennung;
use deaddrop_protocol::control::RelaisNachricht;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

/// Handle auf die Send-Queue einer lebenden Verbindung
#[derive(Clone, Debug)]
pub struct VerbindungsHandle {
    pub kennung: Kennung,
    tx: mpsc::Sender<RelaisNachricht>,
}

impl VerbindungsHandle {
    /// Reiht eine Nachricht nicht-blockierend in die Send-Queue ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist;
    /// die Nachricht ist dann verworfen (best effort).
    pub fn senden(&self, nachricht: RelaisNachricht) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(kennung = %self.kennung, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(kennung = %self.kennung, "Send-Queue geschlossen (Verbindung weg)");
                false
            }
        }
    }
}

/// Prozessweites Verbindungsregister
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct VerbindungsRegister {
    inner: Arc<DashMap<Kennung, VerbindungsHandle>>,
}

impl VerbindungsRegister {
    /// Erstellt ein leeres Register
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die Verbindungs-Task liest aus der Queue und schreibt auf den
    /// Transport. Der zweite Rueckgabewert ist der ersetzte Handle, falls
    /// fuer die Kennung bereits eine Verbindung eingetragen war.
    pub fn registrieren(
        &self,
        kennung: Kennung,
    ) -> (mpsc::Receiver<RelaisNachricht>, Option<VerbindungsHandle>) {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let handle = VerbindungsHandle {
            kennung: kennung.clone(),
            tx,
        };
        let vorherige = self.inner.insert(kennung.clone(), handle);
        if vorherige.is_some() {
            tracing::info!(kennung = %kennung, "Bestehende Verbindung ersetzt (last-writer-wins)");
        } else {
            tracing::debug!(kennung = %kennung, "Verbindung registriert");
        }
        (rx, vorherige)
    }

    /// Entfernt den Eintrag einer Kennung; No-op wenn keiner existiert
    pub fn entfernen(&self, kennung: &Kennung) {
        if self.inner.remove(kennung).is_some() {
            tracing::debug!(kennung = %kennung, "Verbindung entfernt");
        }
    }

    /// Nicht-blockierender Lookup
    pub fn suche(&self, kennung: &Kennung) -> Option<VerbindungsHandle> {
        self.inner.get(kennung).map(|eintrag| eintrag.clone())
    }

    /// Prueft ob eine Kennung registriert ist
    pub fn ist_registriert(&self, kennung: &Kennung) -> bool {
        self.inner.contains_key(kennung)
    }

    /// Anzahl der lebenden Verbindungen
    pub fn anzahl(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrieren_und_suchen_round_trip() {
        let register = VerbindungsRegister::neu();
        let kennung = Kennung::neu("agent_zero");

        let (mut rx, vorherige) = register.registrieren(kennung.clone());
        assert!(vorherige.is_none());
        assert!(register.ist_registriert(&kennung));

        let handle = register.suche(&kennung).expect("Handle erwartet");
        assert!(handle.senden(RelaisNachricht::ping(1, 0)));
        assert_eq!(rx.try_recv().unwrap().request_id, 1);
    }

    #[test]
    fn suche_nach_entfernen_ist_leer() {
        let register = VerbindungsRegister::neu();
        let kennung = Kennung::neu("spectre");

        let (_rx, _) = register.registrieren(kennung.clone());
        register.entfernen(&kennung);
        assert!(register.suche(&kennung).is_none());

        // Entfernen ohne Eintrag ist ein No-op
        register.entfernen(&kennung);
        assert_eq!(register.anzahl(), 0);
    }

    #[test]
    fn neue_verbindung_ersetzt_alte() {
        let register = VerbindungsRegister::neu();
        let kennung = Kennung::neu("agent_zero");

        let (mut rx_alt, _) = register.registrieren(kennung.clone());
        let (mut rx_neu, vorherige) = register.registrieren(kennung.clone());

        // Der ersetzte Handle wird zurueckgegeben, nicht geschlossen
        assert!(vorherige.is_some());
        assert_eq!(register.anzahl(), 1);

        // Zustellungen landen nur noch bei der neuen Verbindung
        register
            .suche(&kennung)
            .unwrap()
            .senden(RelaisNachricht::ping(5, 0));
        assert!(rx_alt.try_recv().is_err());
        assert_eq!(rx_neu.try_recv().unwrap().request_id, 5);
    }

    #[test]
    fn senden_an_geschlossene_queue_schlaegt_fehl() {
        let register = VerbindungsRegister::neu();
        let kennung = Kennung::neu("oracle");

        let (rx, _) = register.registrieren(kennung.clone());
        drop(rx);

        let handle = register.suche(&kennung).unwrap();
        assert!(!handle.senden(RelaisNachricht::ping(1, 0)));
    }

    #[test]
    fn volle_queue_verwirft_nachricht() {
        let register = VerbindungsRegister::neu();
        let kennung = Kennung::neu("dm-mike");

        let (_rx, _) = register.registrieren(kennung.clone());
        let handle = register.suche(&kennung).unwrap();

        for i in 0..SEND_QUEUE_GROESSE as u32 {
            assert!(handle.senden(RelaisNachricht::ping(i, 0)));
        }
        // Queue ist voll, weitere Nachrichten werden verworfen
        assert!(!handle.senden(RelaisNachricht::ping(999, 0)));
    }
}
