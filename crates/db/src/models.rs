//! Datensatz-Modelle fuer Deaddrop
//!
//! Diese Typen repraesentieren Dokumente aus den externen Stores
//! (Credential-Store, Gruppen-Verzeichnis, Threat-Senke). Sie sind reine
//! Datenuebertragungsobjekte; die Serde-Feldnamen sind Teil der
//! Schnittstelle zur Kommandokonsole und duerfen nicht umbenannt werden.

use chrono::{DateTime, Utc};
use deaddrop_core::types::{GruppenId, Kennung, Rolle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Konten (Credential Store)
// ---------------------------------------------------------------------------

/// Credential-Datensatz eines Kontos
///
/// `duress_hash` darf niemals gegen das Primaerpasswort verifizieren; das
/// wird bei der Vergabe ueber die Klartext-Eindeutigkeitspruefung garantiert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KontoRecord {
    pub kennung: Kennung,
    pub rolle: Rolle,
    /// PHC-String des Primaerpassworts (Argon2id)
    pub passwort_hash: String,
    /// PHC-String des Duress-Passworts; `None` bis zur Erstanmeldung
    pub duress_hash: Option<String>,
    /// Erstanmeldungs-Flag: solange gesetzt, wurde noch kein
    /// Duress-Passwort vergeben
    pub erstanmeldung: bool,
    /// Ob der Online-Status fuer Kontakte sichtbar ist
    pub status_sichtbar: bool,
    pub erstellt_am: DateTime<Utc>,
    pub letzter_login: Option<DateTime<Utc>>,
}

/// Daten zum Anlegen eines neuen Kontos
#[derive(Debug, Clone)]
pub struct NeuesKonto<'a> {
    pub kennung: &'a str,
    pub rolle: Rolle,
    pub passwort_hash: &'a str,
    pub duress_hash: Option<&'a str>,
    pub erstanmeldung: bool,
}

/// Atomarer Teil-Patch eines Kontos
///
/// `None`-Felder bleiben unveraendert.
#[derive(Debug, Clone, Default)]
pub struct KontoUpdate {
    pub passwort_hash: Option<String>,
    pub duress_hash: Option<String>,
    pub erstanmeldung: Option<bool>,
    pub status_sichtbar: Option<bool>,
    pub letzter_login: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Gruppen (Gruppen-Verzeichnis)
// ---------------------------------------------------------------------------

/// Gruppen-Datensatz
///
/// Die Mitgliederliste hat Mengen-Semantik; die Reihenfolge ist ohne
/// Bedeutung. Mitgliedschafts-Aenderungen gehoeren dem externen Verzeichnis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GruppeRecord {
    pub id: GruppenId,
    pub name: String,
    pub admin: Kennung,
    #[serde(rename = "members")]
    pub mitglieder: Vec<Kennung>,
    #[serde(rename = "createdAt")]
    pub erstellt_am: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Bedrohungen (Threat-Senke)
// ---------------------------------------------------------------------------

/// Bearbeitungsstatus eines Vorfalls
///
/// Der Status ist das einzige Feld, das nach dem Anhaengen noch mutiert wird
/// (durch die Kommandokonsole).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedrohungsStatus {
    Pending,
    Reviewing,
    Mitigated,
}

impl std::fmt::Display for BedrohungsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Reviewing => write!(f, "Reviewing"),
            Self::Mitigated => write!(f, "Mitigated"),
        }
    }
}

/// Sicherheitsvorfall fuer die Kommandokonsole
///
/// Append-only: Vorfaelle werden nie dedupliziert oder geloescht.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrohungRecord {
    pub id: Uuid,
    /// Taxonomie-Tag (geschlossenes Enum, definiert in deaddrop-threat)
    #[serde(rename = "kind")]
    pub art: String,
    #[serde(rename = "source")]
    pub quelle: String,
    #[serde(rename = "reportedBy")]
    pub gemeldet_von: Kennung,
    #[serde(rename = "timestamp")]
    pub zeitpunkt: DateTime<Utc>,
    pub status: BedrohungsStatus,
    pub details: String,
}
