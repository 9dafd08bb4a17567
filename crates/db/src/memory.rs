//! In-Memory Dokument-Store
//!
//! Referenz-Implementierung aller Repository-Traits fuer Server-Betrieb und
//! Tests. Jede Collection liegt hinter einem eigenen `RwLock`; der
//! Compare-and-Swap in `erstanmeldung_abschliessen` ist dadurch atomar
//! (Pruefung und Mutation unter demselben Write-Lock).

use chrono::Utc;
use deaddrop_core::types::{GruppenId, Kennung};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{
    BedrohungRecord, BedrohungsStatus, GruppeRecord, KontoRecord, KontoUpdate, NeuesKonto,
};
use crate::repository::{BedrohungsRepository, GruppenRepository, KontoRepository};

/// In-Memory Store mit Konten, Gruppen und Bedrohungen
#[derive(Default)]
pub struct MemoryStore {
    konten: RwLock<Vec<KontoRecord>>,
    gruppen: RwLock<Vec<GruppeRecord>>,
    bedrohungen: RwLock<Vec<BedrohungRecord>>,
}

impl MemoryStore {
    /// Erstellt einen leeren Store
    pub fn neu() -> Self {
        Self::default()
    }

    /// Fuegt eine Gruppe direkt ein (Seeding / Tests)
    pub async fn gruppe_einfuegen(&self, gruppe: GruppeRecord) {
        self.gruppen.write().await.push(gruppe);
    }

    /// Gibt die Anzahl der Konten zurueck
    pub async fn konten_anzahl(&self) -> usize {
        self.konten.read().await.len()
    }
}

impl KontoRepository for MemoryStore {
    async fn finde(&self, kennung: &str) -> DbResult<Option<KontoRecord>> {
        let konten = self.konten.read().await;
        Ok(konten
            .iter()
            .find(|k| k.kennung.als_str().eq_ignore_ascii_case(kennung))
            .cloned())
    }

    async fn erstellen(&self, konto: NeuesKonto<'_>) -> DbResult<KontoRecord> {
        let mut konten = self.konten.write().await;
        if konten
            .iter()
            .any(|k| k.kennung.als_str().eq_ignore_ascii_case(konto.kennung))
        {
            return Err(DbError::konflikt(konto.kennung));
        }

        let record = KontoRecord {
            kennung: Kennung::neu(konto.kennung),
            rolle: konto.rolle,
            passwort_hash: konto.passwort_hash.to_string(),
            duress_hash: konto.duress_hash.map(str::to_string),
            erstanmeldung: konto.erstanmeldung,
            status_sichtbar: true,
            erstellt_am: Utc::now(),
            letzter_login: None,
        };
        konten.push(record.clone());
        Ok(record)
    }

    async fn aktualisieren(&self, kennung: &str, patch: KontoUpdate) -> DbResult<KontoRecord> {
        let mut konten = self.konten.write().await;
        let konto = konten
            .iter_mut()
            .find(|k| k.kennung.als_str().eq_ignore_ascii_case(kennung))
            .ok_or_else(|| DbError::nicht_gefunden(kennung))?;

        if let Some(hash) = patch.passwort_hash {
            konto.passwort_hash = hash;
        }
        if let Some(hash) = patch.duress_hash {
            konto.duress_hash = Some(hash);
        }
        if let Some(flag) = patch.erstanmeldung {
            konto.erstanmeldung = flag;
        }
        if let Some(sichtbar) = patch.status_sichtbar {
            konto.status_sichtbar = sichtbar;
        }
        if let Some(zeit) = patch.letzter_login {
            konto.letzter_login = Some(zeit);
        }
        Ok(konto.clone())
    }

    async fn erstanmeldung_abschliessen(
        &self,
        kennung: &str,
        duress_hash: &str,
    ) -> DbResult<bool> {
        let mut konten = self.konten.write().await;
        let konto = konten
            .iter_mut()
            .find(|k| k.kennung.als_str().eq_ignore_ascii_case(kennung))
            .ok_or_else(|| DbError::nicht_gefunden(kennung))?;

        if !konto.erstanmeldung {
            return Ok(false);
        }
        konto.duress_hash = Some(duress_hash.to_string());
        konto.erstanmeldung = false;
        Ok(true)
    }
}

impl GruppenRepository for MemoryStore {
    async fn aufloesen(&self, id: &GruppenId) -> DbResult<Option<GruppeRecord>> {
        let gruppen = self.gruppen.read().await;
        Ok(gruppen.iter().find(|g| &g.id == id).cloned())
    }
}

impl BedrohungsRepository for MemoryStore {
    async fn anhaengen(&self, vorfall: BedrohungRecord) -> DbResult<()> {
        let mut bedrohungen = self.bedrohungen.write().await;
        tracing::debug!(
            id = %vorfall.id,
            art = %vorfall.art,
            gemeldet_von = %vorfall.gemeldet_von,
            "Vorfall angehaengt"
        );
        bedrohungen.push(vorfall);
        Ok(())
    }

    async fn liste(&self) -> DbResult<Vec<BedrohungRecord>> {
        let bedrohungen = self.bedrohungen.read().await;
        let mut alle: Vec<BedrohungRecord> = bedrohungen.clone();
        alle.sort_by(|a, b| b.zeitpunkt.cmp(&a.zeitpunkt));
        Ok(alle)
    }

    async fn status_setzen(
        &self,
        id: Uuid,
        status: BedrohungsStatus,
    ) -> DbResult<Option<BedrohungRecord>> {
        let mut bedrohungen = self.bedrohungen.write().await;
        match bedrohungen.iter_mut().find(|b| b.id == id) {
            Some(vorfall) => {
                vorfall.status = status;
                Ok(Some(vorfall.clone()))
            }
            None => Ok(None),
        }
    }

    async fn finde(&self, id: Uuid) -> DbResult<Option<BedrohungRecord>> {
        let bedrohungen = self.bedrohungen.read().await;
        Ok(bedrohungen.iter().find(|b| b.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deaddrop_core::types::Rolle;

    fn test_konto<'a>(kennung: &'a str) -> NeuesKonto<'a> {
        NeuesKonto {
            kennung,
            rolle: Rolle::Operative,
            passwort_hash: "$argon2id$dummy",
            duress_hash: None,
            erstanmeldung: true,
        }
    }

    #[tokio::test]
    async fn konto_erstellen_und_case_insensitiv_finden() {
        let store = MemoryStore::neu();
        store.erstellen(test_konto("Agent_Zero")).await.unwrap();

        let gefunden = KontoRepository::finde(&store, "AGENT_zero").await.unwrap();
        assert!(gefunden.is_some());
        // Kennung bleibt case-erhaltend gespeichert
        assert_eq!(gefunden.unwrap().kennung.als_str(), "Agent_Zero");
    }

    #[tokio::test]
    async fn doppelte_kennung_ist_konflikt() {
        let store = MemoryStore::neu();
        store.erstellen(test_konto("spectre")).await.unwrap();
        let ergebnis = store.erstellen(test_konto("SPECTRE")).await;
        assert!(matches!(ergebnis, Err(DbError::Konflikt(_))));
    }

    #[tokio::test]
    async fn patch_aendert_nur_gesetzte_felder() {
        let store = MemoryStore::neu();
        store.erstellen(test_konto("oracle")).await.unwrap();

        let aktualisiert = store
            .aktualisieren(
                "oracle",
                KontoUpdate {
                    status_sichtbar: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!aktualisiert.status_sichtbar);
        assert!(aktualisiert.erstanmeldung, "Flag darf nicht angefasst werden");
        assert_eq!(aktualisiert.passwort_hash, "$argon2id$dummy");
    }

    #[tokio::test]
    async fn erstanmeldung_cas_hat_genau_einen_gewinner() {
        let store = MemoryStore::neu();
        store.erstellen(test_konto("agent_zero")).await.unwrap();

        let erster = store
            .erstanmeldung_abschliessen("agent_zero", "$argon2id$duress1")
            .await
            .unwrap();
        let zweiter = store
            .erstanmeldung_abschliessen("agent_zero", "$argon2id$duress2")
            .await
            .unwrap();

        assert!(erster);
        assert!(!zweiter, "Zweiter Versuch darf den Swap nicht gewinnen");

        let konto = KontoRepository::finde(&store, "agent_zero").await.unwrap().unwrap();
        assert!(!konto.erstanmeldung);
        assert_eq!(konto.duress_hash.as_deref(), Some("$argon2id$duress1"));
    }

    #[tokio::test]
    async fn gruppe_aufloesen() {
        let store = MemoryStore::neu();
        store
            .gruppe_einfuegen(GruppeRecord {
                id: GruppenId::neu("alpha"),
                name: "Alpha Group".into(),
                admin: Kennung::neu("alpha-lead"),
                mitglieder: vec![Kennung::neu("alpha-lead"), Kennung::neu("agent_zero")],
                erstellt_am: Utc::now(),
            })
            .await;

        let gruppe = store.aufloesen(&GruppenId::neu("alpha")).await.unwrap();
        assert_eq!(gruppe.unwrap().mitglieder.len(), 2);

        let fehlt = store.aufloesen(&GruppenId::neu("beta")).await.unwrap();
        assert!(fehlt.is_none());
    }

    #[tokio::test]
    async fn bedrohungen_append_only_ohne_dedup() {
        let store = MemoryStore::neu();
        let vorfall = BedrohungRecord {
            id: Uuid::new_v4(),
            art: "duress".into(),
            quelle: "Operative Credential".into(),
            gemeldet_von: Kennung::neu("agent_zero"),
            zeitpunkt: Utc::now(),
            status: BedrohungsStatus::Pending,
            details: "test".into(),
        };

        store.anhaengen(vorfall.clone()).await.unwrap();
        let mut zweiter = vorfall.clone();
        zweiter.id = Uuid::new_v4();
        store.anhaengen(zweiter).await.unwrap();

        // Zwei Meldungen -> zwei Vorfaelle, keine Deduplizierung
        assert_eq!(store.liste().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn status_setzen_mutiert_nur_status() {
        let store = MemoryStore::neu();
        let id = Uuid::new_v4();
        store
            .anhaengen(BedrohungRecord {
                id,
                art: "phishing".into(),
                quelle: "Personal Email".into(),
                gemeldet_von: Kennung::neu("agent_zero"),
                zeitpunkt: Utc::now(),
                status: BedrohungsStatus::Pending,
                details: "Verdaechtiger Link".into(),
            })
            .await
            .unwrap();

        let aktualisiert = store
            .status_setzen(id, BedrohungsStatus::Reviewing)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(aktualisiert.status, BedrohungsStatus::Reviewing);
        assert_eq!(aktualisiert.details, "Verdaechtiger Link");

        let unbekannt = store
            .status_setzen(Uuid::new_v4(), BedrohungsStatus::Mitigated)
            .await
            .unwrap();
        assert!(unbekannt.is_none());
    }
}
