//! Bedrohungs-Taxonomie
//!
//! Geschlossenes Enum statt Freitext: die Art eines Vorfalls wird als
//! maschinenlesbarer Tag gespeichert und exhaustiv gematcht. Unbekannte
//! Tags aus Fremdquellen landen in `Other` statt einen Fehler auszuloesen.

use serde::{Deserialize, Serialize};

/// Art eines Sicherheitsvorfalls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BedrohungsArt {
    /// Duress-Protokoll aktiviert (Credential oder Geste)
    Duress,
    /// Phishing-Versuch gegen ein Konto
    Phishing,
    /// Anomaler ausgehender Datenverkehr
    Exfiltration,
    /// Fehlgeschlagene Zugriffsversuche auf Infrastruktur
    UnauthorizedAccess,
    /// Alles andere
    Other,
}

impl BedrohungsArt {
    /// Gibt den Store-Tag zurueck (identisch mit dem Serde-Tag)
    pub fn als_tag(&self) -> &'static str {
        match self {
            Self::Duress => "duress",
            Self::Phishing => "phishing",
            Self::Exfiltration => "exfiltration",
            Self::UnauthorizedAccess => "unauthorized-access",
            Self::Other => "other",
        }
    }

    /// Parst einen Store-Tag; unbekannte Tags werden `Other`
    pub fn von_tag(tag: &str) -> Self {
        match tag {
            "duress" => Self::Duress,
            "phishing" => Self::Phishing,
            "exfiltration" => Self::Exfiltration,
            "unauthorized-access" => Self::UnauthorizedAccess,
            _ => Self::Other,
        }
    }

    /// Anzeige-Label fuer die Kommandokonsole
    pub fn konsolen_label(&self) -> &'static str {
        match self {
            Self::Duress => "DURESS ALERT (CODE RED SKY)",
            Self::Phishing => "Phishing Attempt",
            Self::Exfiltration => "Anomalous Data Exfiltration",
            Self::UnauthorizedAccess => "Unauthorized Access Attempt",
            Self::Other => "Security Incident",
        }
    }
}

impl std::fmt::Display for BedrohungsArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.konsolen_label())
    }
}
