//! Duress-Passwort-Vergabe
//!
//! Bei der ersten erfolgreichen Anmeldung erhaelt jedes Konto genau einmal
//! ein generiertes Duress-Passwort im Format `{adjektiv}-{nomen}-{NN}`.
//! Die Eindeutigkeit wird VOR dem Hashen auf dem Klartext geprueft:
//! Hashes sind Einwegfunktionen, ein Vergleich gespeicherter Hashes kann
//! Kollisionen nicht erkennen. Die Vergabe-Menge lebt im Prozess und wird
//! beim Start mit bekannten Klartexten (Seed-Daten) vorbelegt; Kollisionen
//! mit Passwoertern aus frueheren Prozesslaeufen bleiben eine dokumentierte
//! Luecke.

use std::collections::HashSet;

use parking_lot::Mutex;
use rand::Rng;

/// Adjektive fuer generierte Duress-Passwoerter
const ADJEKTIVE: &[&str] = &[
    "crimson", "silent", "broken", "glass", "iron", "golden", "fallen", "last", "final",
    "shadow", "ghost", "winter",
];

/// Nomen fuer generierte Duress-Passwoerter
const NOMEN: &[&str] = &[
    "tide", "whisper", "arrow", "mirror", "shield", "key", "echo", "star", "protocol",
    "raven", "serpent", "lion",
];

/// Prozessweite Vergabe-Menge fuer Duress-Klartexte
#[derive(Debug, Default)]
pub struct DuressVergabe {
    vergeben: Mutex<HashSet<String>>,
}

impl DuressVergabe {
    /// Erstellt eine leere Vergabe-Menge
    pub fn neu() -> Self {
        Self::default()
    }

    /// Merkt einen bereits vergebenen Klartext vor (Seeding)
    pub fn vormerken(&self, klartext: &str) {
        self.vergeben.lock().insert(klartext.to_lowercase());
    }

    /// Generiert ein frisches, noch nicht vergebenes Duress-Passwort
    ///
    /// Bei Kollision wird neu gewuerfelt, bis ein freier Kandidat gefunden
    /// ist, und der Kandidat wird sofort beansprucht (Pruefung und Eintrag
    /// unter demselben Lock).
    pub fn generieren(&self) -> String {
        let mut rng = rand::rng();
        let mut vergeben = self.vergeben.lock();
        loop {
            let adjektiv = ADJEKTIVE[rng.random_range(0..ADJEKTIVE.len())];
            let nomen = NOMEN[rng.random_range(0..NOMEN.len())];
            let nummer: u8 = rng.random_range(10..100);
            let kandidat = format!("{adjektiv}-{nomen}-{nummer}");

            if vergeben.insert(kandidat.clone()) {
                return kandidat;
            }
        }
    }

    /// Anzahl der bisher beanspruchten Klartexte
    pub fn anzahl(&self) -> usize {
        self.vergeben.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_gueltig(pw: &str) -> bool {
        let teile: Vec<&str> = pw.split('-').collect();
        teile.len() == 3
            && teile[0].chars().all(|c| c.is_ascii_lowercase())
            && !teile[0].is_empty()
            && teile[1].chars().all(|c| c.is_ascii_lowercase())
            && !teile[1].is_empty()
            && teile[2].len() == 2
            && teile[2].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn generiertes_passwort_hat_format() {
        let vergabe = DuressVergabe::neu();
        for _ in 0..50 {
            let pw = vergabe.generieren();
            assert!(format_gueltig(&pw), "Format verletzt: {pw}");
        }
    }

    #[test]
    fn generierte_passwoerter_sind_eindeutig() {
        let vergabe = DuressVergabe::neu();
        let mut gesehen = HashSet::new();
        for _ in 0..200 {
            let pw = vergabe.generieren();
            assert!(gesehen.insert(pw.clone()), "Kollision: {pw}");
        }
        assert_eq!(vergabe.anzahl(), 200);
    }

    #[test]
    fn vorgemerkte_klartexte_werden_nie_vergeben() {
        let vergabe = DuressVergabe::neu();
        vergabe.vormerken("crimson-tide-42");
        for _ in 0..500 {
            assert_ne!(vergabe.generieren(), "crimson-tide-42");
        }
    }

    #[test]
    fn vormerken_ist_case_insensitiv() {
        let vergabe = DuressVergabe::neu();
        vergabe.vormerken("Crimson-Tide-42");
        assert_eq!(vergabe.anzahl(), 1);
        for _ in 0..500 {
            assert_ne!(vergabe.generieren(), "crimson-tide-42");
        }
    }
}
