//! Demo-Fixtures fuer den In-Memory-Store
//!
//! Laedt beim Start den Referenz-Bestand (Konten, Gruppen, historische
//! Vorfaelle), wenn der Store leer ist. Alle Konten starten mit dem
//! Erstanmeldungs-Flag: das Duress-Passwort wird erst bei der ersten
//! erfolgreichen Anmeldung vergeben und offengelegt.

use std::sync::Arc;

use chrono::Utc;
use deaddrop_auth::passwort_hashen;
use deaddrop_core::types::{GruppenId, Kennung, Rolle};
use deaddrop_db::{
    models::{BedrohungRecord, BedrohungsStatus, GruppeRecord, NeuesKonto},
    BedrohungsRepository, KontoRepository, MemoryStore,
};
use deaddrop_threat::BedrohungsArt;
use uuid::Uuid;

/// Standard-Passwort der Demo-Konten
const SEED_PASSWORT: &str = "password123";

/// Laedt die Fixtures; No-op wenn der Store bereits Konten enthaelt
pub async fn fixtures_laden(store: &Arc<MemoryStore>) -> anyhow::Result<()> {
    if store.konten_anzahl().await > 0 {
        tracing::debug!("Store bereits befuellt, Fixtures uebersprungen");
        return Ok(());
    }

    // Ein Hash fuer alle Demo-Konten mit demselben Passwort
    let passwort_hash = passwort_hashen(SEED_PASSWORT)
        .map_err(|e| anyhow::anyhow!("Fixture-Hashing fehlgeschlagen: {e}"))?;

    let konten: &[(&str, Rolle)] = &[
        ("hq_admin", Rolle::Admin),
        ("agent_zero", Rolle::Operative),
        ("dm-sarah", Rolle::Operative),
        ("dm-mike", Rolle::Operative),
        ("alpha-lead", Rolle::Operative),
        ("spectre", Rolle::Operative),
        ("oracle", Rolle::Operative),
        ("family_user", Rolle::Family),
    ];
    for (kennung, rolle) in konten {
        store
            .erstellen(NeuesKonto {
                kennung,
                rolle: *rolle,
                passwort_hash: &passwort_hash,
                duress_hash: None,
                erstanmeldung: true,
            })
            .await?;
    }

    store
        .gruppe_einfuegen(GruppeRecord {
            id: GruppenId::neu("alpha"),
            name: "Alpha Group".into(),
            admin: Kennung::neu("alpha-lead"),
            mitglieder: vec![
                Kennung::neu("alpha-lead"),
                Kennung::neu("agent_zero"),
                Kennung::neu("dm-mike"),
            ],
            erstellt_am: Utc::now(),
        })
        .await;
    store
        .gruppe_einfuegen(GruppeRecord {
            id: GruppenId::neu("work"),
            name: "Project Condor".into(),
            admin: Kennung::neu("agent_zero"),
            mitglieder: vec![Kennung::neu("agent_zero"), Kennung::neu("dm-sarah")],
            erstellt_am: Utc::now(),
        })
        .await;

    // Historische Vorfaelle fuer die Konsole
    let vorfaelle = [
        (
            BedrohungsArt::Phishing,
            "Personal Email",
            "agent_zero",
            BedrohungsStatus::Pending,
            "Received an email with a suspicious link claiming to be an urgent \
             account verification. The linked domain is not official infrastructure.",
        ),
        (
            BedrohungsArt::Exfiltration,
            "Network Monitor",
            "System",
            BedrohungsStatus::Reviewing,
            "Unusual outbound traffic detected from an operative device in the \
             North Sector. Data packet analysis is underway.",
        ),
        (
            BedrohungsArt::UnauthorizedAccess,
            "Firewall Log",
            "System",
            BedrohungsStatus::Pending,
            "Multiple failed login attempts detected on the EU-Central-1 gateway \
             from a blacklisted IP range.",
        ),
    ];
    for (art, quelle, gemeldet_von, status, details) in vorfaelle {
        store
            .anhaengen(BedrohungRecord {
                id: Uuid::new_v4(),
                art: art.als_tag().to_string(),
                quelle: quelle.to_string(),
                gemeldet_von: Kennung::neu(gemeldet_von),
                zeitpunkt: Utc::now(),
                status,
                details: details.to_string(),
            })
            .await?;
    }

    tracing::info!(
        konten = konten.len(),
        gruppen = 2,
        vorfaelle = 3,
        "Demo-Fixtures geladen"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixtures_laden_befuellt_leeren_store() {
        let store = Arc::new(MemoryStore::neu());
        fixtures_laden(&store).await.unwrap();

        assert_eq!(store.konten_anzahl().await, 8);

        let agent = KontoRepository::finde(&*store, "agent_zero").await.unwrap().unwrap();
        assert!(agent.erstanmeldung);
        assert!(agent.duress_hash.is_none());

        let admin = KontoRepository::finde(&*store, "hq_admin").await.unwrap().unwrap();
        assert_eq!(admin.rolle, Rolle::Admin);

        use deaddrop_db::GruppenRepository;
        let alpha = store.aufloesen(&GruppenId::neu("alpha")).await.unwrap().unwrap();
        assert_eq!(alpha.mitglieder.len(), 3);

        assert_eq!(store.liste().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn fixtures_laden_ist_idempotent_auf_befuelltem_store() {
        let store = Arc::new(MemoryStore::neu());
        fixtures_laden(&store).await.unwrap();
        fixtures_laden(&store).await.unwrap();
        assert_eq!(store.konten_anzahl().await, 8);
    }
}
