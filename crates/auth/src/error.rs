//! Fehlertypen fuer die Auth-Engine

use thiserror::Error;

/// Alle moeglichen Fehler der Auth-Engine
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Authentifizierung ---
    /// Eine generische Ablehnung fuer alle Ursachen (Kennung unbekannt,
    /// Rolle falsch, Geheimnis falsch) – verhindert Kennung-Enumeration.
    #[error("Invalid credentials. Please try again.")]
    UngueltigeAnmeldedaten,

    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Sitzungs-Token ---
    #[error("Sitzungs-Token ungueltig")]
    TokenUngueltig,

    #[error("Sitzungs-Token abgelaufen")]
    TokenAbgelaufen,

    // --- Stores ---
    #[error("Store-Fehler: {0}")]
    Datenbank(#[from] deaddrop_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

/// Result-Alias fuer die Auth-Engine
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generische_ablehnung_nennt_keine_ursache() {
        let meldung = AuthError::UngueltigeAnmeldedaten.to_string();
        assert!(!meldung.to_lowercase().contains("role"));
        assert!(!meldung.to_lowercase().contains("user"));
    }
}
