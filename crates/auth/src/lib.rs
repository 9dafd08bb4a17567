//! deaddrop-auth – Auth-Engine mit verdeckter Duress-Erkennung
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Duress-Passwort-Vergabe (Klartext-Eindeutigkeit vor dem Hashen)
//! - Zustandslose, signierte Sitzungs-Tokens (HMAC-SHA256, nur Ablauf)
//! - AuthService: die Login-Zustandsmaschine mit den vier Ausgaengen
//!   Abgelehnt / DuressGewaehrt / Erstanmeldung / NormalGewaehrt

pub mod duress;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use duress::DuressVergabe;
pub use error::{AuthError, AuthResult};
pub use password::{passwort_hashen, passwort_verifizieren};
pub use service::{Anmeldung, AnmeldeAusgang, AuthService};
pub use token::{SitzungsCredential, SitzungsPraeger, TokenAnspruch};
