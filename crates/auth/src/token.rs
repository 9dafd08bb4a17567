//! Sitzungs-Token – zustandslose, signierte Credentials
//!
//! Ein Token bindet Kennung + Rolle an eine Ablaufzeit und wird mit
//! HMAC-SHA256 signiert: `base64url(claims_json).base64url(hmac)`.
//! Es gibt keine serverseitige Widerrufsliste; die Gueltigkeit endet
//! ausschliesslich mit dem Ablaufzeitpunkt.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use deaddrop_core::types::{Kennung, Rolle};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Laenge des zufaellig generierten Signierschluessels in Bytes
const SCHLUESSEL_LAENGE: usize = 32;

/// Signierte Anspruchsdaten eines Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAnspruch {
    pub kennung: Kennung,
    pub rolle: Rolle,
    /// Ablaufzeitpunkt als Unix-Sekunden
    #[serde(rename = "exp")]
    pub laeuft_ab: i64,
}

/// Ausgestelltes Sitzungs-Credential
#[derive(Debug, Clone)]
pub struct SitzungsCredential {
    /// Der opake Token-String
    pub token: String,
    pub laeuft_ab: DateTime<Utc>,
}

/// Praegt und prueft Sitzungs-Tokens
pub struct SitzungsPraeger {
    schluessel: Vec<u8>,
    ttl: Duration,
}

impl SitzungsPraeger {
    /// Erstellt einen Praeger mit gegebenem Schluessel und TTL in Minuten
    pub fn neu(schluessel: Vec<u8>, ttl_minuten: i64) -> Self {
        Self {
            schluessel,
            ttl: Duration::minutes(ttl_minuten),
        }
    }

    /// Erstellt einen Praeger mit zufaelligem Schluessel
    ///
    /// Tokens aus frueheren Prozesslaeufen werden damit ungueltig; fuer
    /// Mehr-Instanz-Betrieb muss der Schluessel konfiguriert werden.
    pub fn mit_zufallsschluessel(ttl_minuten: i64) -> Self {
        let mut schluessel = vec![0u8; SCHLUESSEL_LAENGE];
        rand::rng().fill_bytes(&mut schluessel);
        Self::neu(schluessel, ttl_minuten)
    }

    /// Praegt ein neues Token fuer Kennung + Rolle
    pub fn praegen(&self, kennung: &Kennung, rolle: Rolle) -> AuthResult<SitzungsCredential> {
        let laeuft_ab = Utc::now() + self.ttl;
        let anspruch = TokenAnspruch {
            kennung: kennung.clone(),
            rolle,
            laeuft_ab: laeuft_ab.timestamp(),
        };

        let payload_json = serde_json::to_vec(&anspruch)
            .map_err(|e| AuthError::intern(format!("Anspruch-Serialisierung: {e}")))?;
        let payload = URL_SAFE_NO_PAD.encode(payload_json);
        let signatur = URL_SAFE_NO_PAD.encode(self.signieren(payload.as_bytes()));

        Ok(SitzungsCredential {
            token: format!("{payload}.{signatur}"),
            laeuft_ab,
        })
    }

    /// Prueft Signatur und Ablaufzeit eines Tokens
    pub fn pruefen(&self, token: &str) -> AuthResult<TokenAnspruch> {
        let (payload, signatur) = token.split_once('.').ok_or(AuthError::TokenUngueltig)?;

        let signatur_bytes = URL_SAFE_NO_PAD
            .decode(signatur)
            .map_err(|_| AuthError::TokenUngueltig)?;

        // Konstantzeit-Vergleich via Mac::verify_slice
        let mut mac = HmacSha256::new_from_slice(&self.schluessel)
            .map_err(|e| AuthError::intern(format!("HMAC-Schluessel: {e}")))?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signatur_bytes)
            .map_err(|_| AuthError::TokenUngueltig)?;

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::TokenUngueltig)?;
        let anspruch: TokenAnspruch =
            serde_json::from_slice(&payload_json).map_err(|_| AuthError::TokenUngueltig)?;

        if anspruch.laeuft_ab <= Utc::now().timestamp() {
            return Err(AuthError::TokenAbgelaufen);
        }
        Ok(anspruch)
    }

    fn signieren(&self, daten: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.schluessel)
            .expect("HMAC akzeptiert Schluessel beliebiger Laenge");
        mac.update(daten);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn praeger() -> SitzungsPraeger {
        SitzungsPraeger::neu(b"test-schluessel-mit-genug-laenge".to_vec(), 60)
    }

    #[test]
    fn praegen_und_pruefen() {
        let p = praeger();
        let credential = p.praegen(&Kennung::neu("agent_zero"), Rolle::Operative).unwrap();

        let anspruch = p.pruefen(&credential.token).unwrap();
        assert_eq!(anspruch.kennung.als_str(), "agent_zero");
        assert_eq!(anspruch.rolle, Rolle::Operative);
        assert!(anspruch.laeuft_ab > Utc::now().timestamp());
    }

    #[test]
    fn manipuliertes_token_wird_abgelehnt() {
        let p = praeger();
        let credential = p.praegen(&Kennung::neu("agent_zero"), Rolle::Operative).unwrap();

        // Payload austauschen, Signatur behalten
        let (_, signatur) = credential.token.split_once('.').unwrap();
        let falscher_anspruch = TokenAnspruch {
            kennung: Kennung::neu("hq_admin"),
            rolle: Rolle::Admin,
            laeuft_ab: Utc::now().timestamp() + 3600,
        };
        let falsches_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&falscher_anspruch).unwrap());
        let manipuliert = format!("{falsches_payload}.{signatur}");

        assert!(matches!(
            p.pruefen(&manipuliert),
            Err(AuthError::TokenUngueltig)
        ));
    }

    #[test]
    fn fremder_schluessel_wird_abgelehnt() {
        let p1 = praeger();
        let p2 = SitzungsPraeger::neu(b"ein-ganz-anderer-schluessel-1234".to_vec(), 60);

        let credential = p1.praegen(&Kennung::neu("spectre"), Rolle::Operative).unwrap();
        assert!(matches!(
            p2.pruefen(&credential.token),
            Err(AuthError::TokenUngueltig)
        ));
    }

    #[test]
    fn abgelaufenes_token_wird_abgelehnt() {
        let p = SitzungsPraeger::neu(b"test-schluessel-mit-genug-laenge".to_vec(), -1);
        let credential = p.praegen(&Kennung::neu("oracle"), Rolle::Operative).unwrap();
        assert!(matches!(
            p.pruefen(&credential.token),
            Err(AuthError::TokenAbgelaufen)
        ));
    }

    #[test]
    fn unfug_wird_abgelehnt() {
        let p = praeger();
        assert!(p.pruefen("kein-token").is_err());
        assert!(p.pruefen("a.b.c").is_err());
        assert!(p.pruefen("").is_err());
    }

    #[test]
    fn zufallsschluessel_praegt_gueltige_tokens() {
        let p = SitzungsPraeger::mit_zufallsschluessel(5);
        let credential = p.praegen(&Kennung::neu("dm-sarah"), Rolle::Family).unwrap();
        let anspruch = p.pruefen(&credential.token).unwrap();
        assert_eq!(anspruch.rolle, Rolle::Family);
    }
}
