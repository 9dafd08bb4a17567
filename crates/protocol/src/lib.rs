//! deaddrop-protocol – Protokoll-Definitionen fuer das Relais
//!
//! - `control`: Nachrichtenarten (Login, Handshake, Umschlag, Zustellung,
//!   Duress-Meldung, Keepalive, Fehler)
//! - `wire`: laengen-praefigiertes JSON-Frame-Format mit `FrameCodec`

pub mod control;
pub mod wire;

// Bequeme Re-Exporte
pub use control::{
    DuressMeldungRequest, DuressMeldungResponse, Envelope, FehlerAntwort, FehlerCode,
    LoginRequest, LoginResponse, OrtAngabe, RelaisNachricht, RelaisPayload, VerbindenRequest,
    VerbundenResponse, Zustellung,
};
pub use wire::{read_frame, write_frame, FrameCodec, DEFAULT_MAX_FRAME_SIZE};
