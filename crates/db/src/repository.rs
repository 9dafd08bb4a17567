//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt den Kern von den konkreten Stores:
//! Credential-Store, Gruppen-Verzeichnis und Threat-Senke sind externe
//! Kollaborateure hinter diesen Traits. `MemoryStore` (siehe `memory`)
//! ist die Referenz-Implementierung fuer Server-Betrieb und Tests.
//!
//! Die Traits verwenden `async fn` ohne Send-Garantie (async_fn_in_trait);
//! Verbindungs-Tasks laufen deshalb auf einer `tokio::task::LocalSet`.

use deaddrop_core::types::GruppenId;

use crate::error::DbResult;
use crate::models::{BedrohungRecord, BedrohungsStatus, GruppeRecord, KontoRecord, KontoUpdate, NeuesKonto};

/// Repository fuer Credential-Datensaetze
#[allow(async_fn_in_trait)]
pub trait KontoRepository {
    /// Sucht ein Konto anhand seiner Kennung (case-insensitiv)
    async fn finde(&self, kennung: &str) -> DbResult<Option<KontoRecord>>;

    /// Legt ein neues Konto an
    ///
    /// Schlaegt mit `DbError::Konflikt` fehl wenn die Kennung
    /// (case-insensitiv) bereits vergeben ist.
    async fn erstellen(&self, konto: NeuesKonto<'_>) -> DbResult<KontoRecord>;

    /// Atomarer Teil-Patch eines Kontos
    async fn aktualisieren(&self, kennung: &str, patch: KontoUpdate) -> DbResult<KontoRecord>;

    /// Schliesst die Erstanmeldung ab (compare-and-swap)
    ///
    /// Setzt `duress_hash` und loescht das Erstanmeldungs-Flag, aber nur
    /// wenn das Flag noch gesetzt ist. Gibt `true` zurueck wenn dieser
    /// Aufrufer den Swap gewonnen hat. Zwei konkurrierende Erstanmeldungen
    /// desselben Kontos haben damit genau einen Gewinner.
    async fn erstanmeldung_abschliessen(
        &self,
        kennung: &str,
        duress_hash: &str,
    ) -> DbResult<bool>;
}

/// Repository fuer das Gruppen-Verzeichnis (nur lesend)
#[allow(async_fn_in_trait)]
pub trait GruppenRepository {
    /// Loest eine Gruppen-ID in ihren Datensatz auf
    async fn aufloesen(&self, id: &GruppenId) -> DbResult<Option<GruppeRecord>>;
}

/// Repository fuer die Threat-Senke (append-only)
#[allow(async_fn_in_trait)]
pub trait BedrohungsRepository {
    /// Haengt einen neuen Vorfall an
    ///
    /// Doppelte Meldungen erzeugen absichtlich doppelte Vorfaelle –
    /// es findet keine Deduplizierung statt.
    async fn anhaengen(&self, vorfall: BedrohungRecord) -> DbResult<()>;

    /// Gibt alle Vorfaelle zurueck, neueste zuerst
    async fn liste(&self) -> DbResult<Vec<BedrohungRecord>>;

    /// Setzt den Bearbeitungsstatus eines Vorfalls
    ///
    /// Gibt den aktualisierten Datensatz zurueck, `None` wenn die ID
    /// unbekannt ist.
    async fn status_setzen(
        &self,
        id: uuid::Uuid,
        status: BedrohungsStatus,
    ) -> DbResult<Option<BedrohungRecord>>;

    /// Sucht einen einzelnen Vorfall anhand seiner ID
    async fn finde(&self, id: uuid::Uuid) -> DbResult<Option<BedrohungRecord>>;
}
