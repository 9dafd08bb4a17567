//! deaddrop-relay – Realtime-Transportschicht
//!
//! Dieser Crate haelt die lebenden Verbindungen des Messengers und stellt
//! eingehende Umschlaege an einen Empfaenger oder eine Gruppe zu.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (RelaisServer, LocalSet)
//!     |
//!     v
//! ClientVerbindung (pro Verbindung ein Task)
//!     |  Zustaende: Verbunden -> Authentifiziert
//!     v
//! RelaisDispatcher
//!     +-- Login / Verbinden  (Auth-Engine, danach Registrierung)
//!     +-- Nachricht          (NachrichtenRouter, fire-and-forget)
//!     +-- DuressMeldung      (DuressMelder, dedizierte Notfall-Geste)
//!
//! VerbindungsRegister – Kennung -> lebende Verbindung (last-writer-wins)
//! NachrichtenRouter   – Einzelzustellung + Gruppen-Fanout ohne Absender
//! ```

pub mod connection;
pub mod dispatcher;
pub mod registry;
pub mod router;
pub mod tcp;
pub mod zustand;

// Bequeme Re-Exporte
pub use connection::ClientVerbindung;
pub use dispatcher::{DispatcherContext, RelaisDispatcher};
pub use registry::{VerbindungsHandle, VerbindungsRegister};
pub use router::NachrichtenRouter;
pub use tcp::RelaisServer;
pub use zustand::{RelaisConfig, RelaisZustand};
