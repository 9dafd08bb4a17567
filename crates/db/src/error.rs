//! Fehlertypen fuer die Datenzugriffsschicht

use thiserror::Error;

/// Result-Alias fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Alle moeglichen Fehler der Datenzugriffsschicht
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Datensatz nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Datensatz existiert bereits: {0}")]
    Konflikt(String),

    #[error("Store nicht erreichbar: {0}")]
    NichtErreichbar(String),

    #[error("Interner Store-Fehler: {0}")]
    Intern(String),
}

impl DbError {
    pub fn nicht_gefunden(was: impl Into<String>) -> Self {
        Self::NichtGefunden(was.into())
    }

    pub fn konflikt(was: impl Into<String>) -> Self {
        Self::Konflikt(was.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = DbError::nicht_gefunden("agent_zero");
        assert_eq!(e.to_string(), "Datensatz nicht gefunden: agent_zero");
    }
}
