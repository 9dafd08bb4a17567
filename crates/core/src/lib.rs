//! deaddrop-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Identifikationstypen bereit, die von allen
//! anderen Deaddrop-Crates gemeinsam genutzt werden. Fehlertypen sind
//! bewusst Sache der einzelnen Crates (`DbError`, `AuthError`, ...).

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{GruppenId, Kennung, Rolle};
