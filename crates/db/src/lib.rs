//! deaddrop-db – Store-agnostische Datenzugriffsschicht
//!
//! Die drei externen Stores des Systems stehen hinter Repository-Traits:
//! - `KontoRepository`   – Credential-Store (Konten, Duress-Hashes)
//! - `GruppenRepository` – Gruppen-Verzeichnis (nur lesend)
//! - `BedrohungsRepository` – Threat-Senke (append-only)
//!
//! `MemoryStore` ist die mitgelieferte In-Memory-Referenzimplementierung.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

// Bequeme Re-Exporte
pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use models::{
    BedrohungRecord, BedrohungsStatus, GruppeRecord, KontoRecord, KontoUpdate, NeuesKonto,
};
pub use repository::{BedrohungsRepository, GruppenRepository, KontoRepository};
