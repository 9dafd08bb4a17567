//! deaddrop-threat – Bedrohungs-Taxonomie und Duress-Meldeweg
//!
//! Dieses Crate implementiert:
//! - `BedrohungsArt`: geschlossene Taxonomie der Vorfallsarten
//! - `analysieren`: vorbereitete Analyse pro Art (exhaustiver Match)
//! - `DuressMelder`: fire-and-forget Uebersetzung eines Duress-Signals
//!   in einen Vorfall der Threat-Senke

pub mod analyse;
pub mod art;
pub mod melder;

// Bequeme Re-Exporte
pub use analyse::{analysieren, BedrohungsAnalyse};
pub use art::BedrohungsArt;
pub use melder::{vorfall_bauen, DuressMelder, GeoOrt};
