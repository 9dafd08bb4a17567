//! Vorfalls-Analyse fuer die Kommandokonsole
//!
//! Liefert pro Bedrohungsart eine vorbereitete Einschaetzung samt
//! Massnahmenkatalog. Der Match ist exhaustiv; neue Arten erzwingen
//! zur Compilezeit eine neue Analyse.

use serde::{Deserialize, Serialize};

use crate::art::BedrohungsArt;

/// Analyse-Ergebnis zu einem Vorfall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrohungsAnalyse {
    #[serde(rename = "summary")]
    pub zusammenfassung: String,
    #[serde(rename = "mitigationSteps")]
    pub massnahmen: Vec<String>,
}

/// Erstellt die Analyse zu einer Bedrohungsart
pub fn analysieren(art: BedrohungsArt) -> BedrohungsAnalyse {
    match art {
        BedrohungsArt::Duress => BedrohungsAnalyse {
            zusammenfassung: "High-probability duress situation. The operative's \
                activation of this protocol is a critical alert that requires an \
                immediate, covert response."
                .into(),
            massnahmen: vec![
                "DO NOT attempt to contact the operative through the network.".into(),
                "Activate live tracking on the operative's device if available.".into(),
                "Dispatch the nearest Quick Reaction Force to the last known coordinates.".into(),
                "Monitor the operative's comms for unusual activity or keywords.".into(),
            ],
        },
        BedrohungsArt::Phishing => BedrohungsAnalyse {
            zusammenfassung: "Indicators of a targeted phishing campaign mimicking \
                official infrastructure, most likely aimed at credential harvesting."
                .into(),
            massnahmen: vec![
                "Block the reported domain network-wide.".into(),
                "Issue a global alert to all operatives about this attempt.".into(),
                "Scan network logs for access attempts to the malicious domain.".into(),
                "Initiate a password reset for the reporting operative as a precaution.".into(),
            ],
        },
        BedrohungsArt::Exfiltration => BedrohungsAnalyse {
            zusammenfassung: "Outbound traffic volume significantly above the device's \
                baseline towards a destination outside the whitelist; potential data \
                breach."
                .into(),
            massnahmen: vec![
                "Quarantine the operative's device from the network immediately.".into(),
                "Begin forensic analysis of captured data packets.".into(),
                "Remotely trigger a security scan on the device.".into(),
                "Alert the operative's handler to investigate device compromise.".into(),
            ],
        },
        BedrohungsArt::UnauthorizedAccess => BedrohungsAnalyse {
            zusammenfassung: "Repeated failed authentication attempts against gateway \
                infrastructure, consistent with a brute-force probe."
                .into(),
            massnahmen: vec![
                "Verify the source IP range against the blacklist and extend it.".into(),
                "Review gateway audit logs for successful logins from the range.".into(),
                "Rotate credentials of accounts targeted by the attempts.".into(),
            ],
        },
        BedrohungsArt::Other => BedrohungsAnalyse {
            zusammenfassung: "Standard threat detected. Follow protocol.".into(),
            massnahmen: vec![
                "Monitor associated network traffic.".into(),
                "Verify operative status via a secondary channel.".into(),
                "Log all actions taken.".into(),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jede_art_hat_massnahmen() {
        for art in [
            BedrohungsArt::Duress,
            BedrohungsArt::Phishing,
            BedrohungsArt::Exfiltration,
            BedrohungsArt::UnauthorizedAccess,
            BedrohungsArt::Other,
        ] {
            let analyse = analysieren(art);
            assert!(!analyse.zusammenfassung.is_empty());
            assert!(!analyse.massnahmen.is_empty());
        }
    }

    #[test]
    fn duress_analyse_verbietet_kontaktaufnahme() {
        let analyse = analysieren(BedrohungsArt::Duress);
        assert!(analyse.massnahmen[0].starts_with("DO NOT"));
    }

    #[test]
    fn analyse_wire_feldnamen() {
        let json = serde_json::to_value(analysieren(BedrohungsArt::Other)).unwrap();
        assert!(json.get("summary").is_some());
        assert!(json.get("mitigationSteps").is_some());
    }
}
