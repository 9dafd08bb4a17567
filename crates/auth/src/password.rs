//! Passwort-Hashing mit Argon2id
//!
//! Primaer- und Duress-Passwoerter werden identisch gehasht (PHC-Strings),
//! damit die beiden Vergleiche im Login-Pfad nicht anhand des Hash-Formats
//! unterscheidbar sind.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

use crate::error::AuthError;

/// Argon2id-Instanz mit OWASP-Parametern (64 MiB, 3 Iterationen, 1 Thread)
fn argon2_instanz() -> Argon2<'static> {
    let params =
        Params::new(64 * 1024, 3, 1, None).expect("Argon2-Parameter ungueltig");
    Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
}

/// Hasht ein Passwort mit Argon2id und zufaelligem Salt, gibt den PHC-String zurueck
pub fn passwort_hashen(passwort: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2_instanz()
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswortHashing(e.to_string()))
}

/// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
pub fn passwort_verifizieren(passwort: &str, hash: &str) -> Result<bool, AuthError> {
    let geparst = PasswordHash::new(hash)
        .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

    match argon2_instanz().verify_password(passwort.as_bytes(), &geparst) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashen_und_verifizieren() {
        let hash = passwort_hashen("password123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(passwort_verifizieren("password123", &hash).unwrap());
        assert!(!passwort_verifizieren("password124", &hash).unwrap());
    }

    #[test]
    fn gleiches_passwort_verschiedene_hashes() {
        let h1 = passwort_hashen("crimson-tide-42").unwrap();
        let h2 = passwort_hashen("crimson-tide-42").unwrap();
        assert_ne!(h1, h2, "Salt muss die Hashes unterscheiden");
    }

    #[test]
    fn kaputtes_hash_format_ist_fehler() {
        assert!(passwort_verifizieren("egal", "kein-phc-string").is_err());
    }
}
