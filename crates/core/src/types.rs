//! Gemeinsame Identifikationstypen fuer Deaddrop
//!
//! Kennungen sind im Netzwerk vom Credential-Store vergebene String-Handles
//! (z.B. `agent_zero`), keine UUIDs. Das Newtype-Pattern verhindert
//! Verwechslungen zwischen Benutzer-Kennungen und Gruppen-IDs zur Compilezeit.

use serde::{Deserialize, Serialize};

/// Eindeutige Benutzer-Kennung (String-Handle)
///
/// Die Kennung wird case-erhaltend gespeichert; der case-insensitive
/// Vergleich beim Login ist Sache des Credential-Stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kennung(pub String);

impl Kennung {
    /// Erstellt eine Kennung aus einem beliebigen String-Wert
    pub fn neu(wert: impl Into<String>) -> Self {
        Self(wert.into())
    }

    /// Gibt die Kennung als `&str` zurueck
    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Kennung {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Kennung {
    fn from(wert: &str) -> Self {
        Self(wert.to_string())
    }
}

impl From<String> for Kennung {
    fn from(wert: String) -> Self {
        Self(wert)
    }
}

/// Eindeutige Gruppen-ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GruppenId(pub String);

impl GruppenId {
    /// Erstellt eine Gruppen-ID aus einem beliebigen String-Wert
    pub fn neu(wert: impl Into<String>) -> Self {
        Self(wert.into())
    }

    /// Gibt die ID als `&str` zurueck
    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GruppenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GruppenId {
    fn from(wert: &str) -> Self {
        Self(wert.to_string())
    }
}

/// Rolle eines Kontos
///
/// Die Rolle wird beim Login mitgesendet und muss mit der im Credential-Store
/// hinterlegten Rolle uebereinstimmen (Portal-Trennung).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rolle {
    /// Regulaerer Feld-Benutzer des Messengers
    Operative,
    /// Administrator der Kommandokonsole
    Admin,
    /// Angehoerigen-Konto mit eingeschraenktem Zugriff
    Family,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Operative => "operative",
            Self::Admin => "admin",
            Self::Family => "family",
        }
    }
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.als_str())
    }
}

impl std::str::FromStr for Rolle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operative" => Ok(Self::Operative),
            "admin" => Ok(Self::Admin),
            "family" => Ok(Self::Family),
            andere => Err(format!("Unbekannte Rolle: {andere}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kennung_transparent_serialisiert() {
        let k = Kennung::neu("agent_zero");
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"agent_zero\"");
        let zurueck: Kennung = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, k);
    }

    #[test]
    fn rolle_lowercase_tags() {
        assert_eq!(serde_json::to_string(&Rolle::Operative).unwrap(), "\"operative\"");
        assert_eq!(serde_json::to_string(&Rolle::Family).unwrap(), "\"family\"");
        let r: Rolle = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(r, Rolle::Admin);
    }

    #[test]
    fn rolle_from_str() {
        assert_eq!(Rolle::from_str("operative").unwrap(), Rolle::Operative);
        assert!(Rolle::from_str("hq").is_err());
    }

    #[test]
    fn gruppen_id_anzeige() {
        let g = GruppenId::neu("alpha");
        assert_eq!(g.to_string(), "alpha");
    }
}
