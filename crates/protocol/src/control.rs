//! Relais-Protokoll (TCP)
//!
//! Definiert alle Nachrichten die ueber die Relais-Verbindung zwischen
//! Client und Server ausgetauscht werden.
//!
//! ## Design
//! - Request/Response-Pattern: jede Nachricht traegt eine `request_id: u32`
//! - JSON-Serialisierung via serde; die Wire-Feldnamen (`to`, `isGroup`,
//!   `groupId`, ...) sind Schnittstelle zu den externen Kollaborateuren
//!   und duerfen nicht umbenannt werden
//! - Tagged Enum fuer typsichere Nachrichtenarten

use serde::{Deserialize, Serialize};
use deaddrop_core::types::Rolle;

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Fehler-Antworten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FehlerCode {
    InternalError,
    InvalidRequest,
    InvalidCredentials,
    NotAuthenticated,
    AlreadyLoggedIn,
}

// ---------------------------------------------------------------------------
// Anmeldung
// ---------------------------------------------------------------------------

/// Login-Anfrage vom Client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    /// Geheimnis im Klartext – der Vergleich gegen Primaer- und
    /// Duress-Hash passiert serverseitig
    pub password: String,
    /// Beanspruchte Rolle (Portal-Trennung)
    pub role: Rolle,
}

/// Erfolgreiche Login-Antwort
///
/// Normale und Duress-Anmeldungen erzeugen Byte-fuer-Byte dieselbe Form:
/// `firstLogin` ist `false` und `duressPassword` ist `null`. Nur die
/// einmalige Erstanmeldungs-Offenlegung setzt beide Felder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    #[serde(rename = "sessionToken")]
    pub session_token: String,
    /// Ablaufzeit des Tokens (Unix-Sekunden)
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
    #[serde(rename = "firstLogin")]
    pub first_login: bool,
    #[serde(rename = "duressPassword")]
    pub duress_password: Option<String>,
}

/// Transport-Handshake mit bestehendem Sitzungs-Token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerbindenRequest {
    #[serde(rename = "sessionToken")]
    pub session_token: String,
}

/// Bestaetigung des Transport-Handshakes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerbundenResponse {
    pub username: String,
}

// ---------------------------------------------------------------------------
// Nachrichten-Umschlag
// ---------------------------------------------------------------------------

/// Eingehender Nachrichten-Umschlag
///
/// Der Absender steht NICHT im Umschlag; er wird aus der authentifizierten
/// Verbindung uebernommen. Die Nutzlast ist fuer das Relais opak und wird
/// unveraendert weitergereicht.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Ziel: Kennung eines Empfaengers oder Gruppen-ID
    #[serde(rename = "to")]
    pub ziel: String,
    #[serde(rename = "isGroup", default)]
    pub ist_gruppe: bool,
    #[serde(flatten)]
    pub nutzlast: serde_json::Map<String, serde_json::Value>,
}

/// Ausgehende Zustellung an einen Empfaenger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zustellung {
    #[serde(rename = "from")]
    pub von: String,
    /// Bei Gruppen-Zustellung die Gruppen-ID, damit der Client die
    /// Nachricht dem richtigen Thread zuordnen kann
    #[serde(rename = "groupId", skip_serializing_if = "Option::is_none")]
    pub gruppe: Option<String>,
    #[serde(flatten)]
    pub nutzlast: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Duress-Meldung (dedizierte Notfall-Geste)
// ---------------------------------------------------------------------------

/// Geokoordinaten in einer Duress-Meldung
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrtAngabe {
    pub lat: f64,
    pub lon: f64,
}

/// Explizite Duress-Meldung (z.B. Biometrie-Geste), unabhaengig vom Login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuressMeldungRequest {
    #[serde(rename = "location")]
    pub ort: Option<OrtAngabe>,
}

/// Bestaetigung einer Duress-Meldung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuressMeldungResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Keepalive & Fehler
// ---------------------------------------------------------------------------

/// Keepalive-Ping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingMessage {
    pub timestamp_ms: u64,
}

/// Keepalive-Pong
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongMessage {
    pub echo_timestamp_ms: u64,
    pub server_timestamp_ms: u64,
}

/// Standardisierte Fehler-Antwort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FehlerAntwort {
    pub code: FehlerCode,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Relais-Nachricht (Umschlag fuer alle Nachrichtenarten)
// ---------------------------------------------------------------------------

/// Inhalt einer Relais-Nachricht
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelaisPayload {
    // Client -> Server
    Login(LoginRequest),
    Verbinden(VerbindenRequest),
    Nachricht(Envelope),
    DuressMeldung(DuressMeldungRequest),
    Ping(PingMessage),

    // Server -> Client
    LoginResponse(LoginResponse),
    Verbunden(VerbundenResponse),
    Zustellung(Zustellung),
    DuressMeldungOk(DuressMeldungResponse),
    Pong(PongMessage),
    Fehler(FehlerAntwort),
}

/// Relais-Nachricht mit Request/Response-Zuordnung
///
/// Der Client vergibt die `request_id`; der Server kopiert sie in die
/// Antwort. Server-initiierte Nachrichten (Zustellungen) tragen `0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaisNachricht {
    pub request_id: u32,
    pub payload: RelaisPayload,
}

impl RelaisNachricht {
    /// Erstellt eine neue Relais-Nachricht
    pub fn neu(request_id: u32, payload: RelaisPayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    /// Erstellt eine Ping-Nachricht
    pub fn ping(request_id: u32, timestamp_ms: u64) -> Self {
        Self::neu(request_id, RelaisPayload::Ping(PingMessage { timestamp_ms }))
    }

    /// Erstellt eine Pong-Antwort
    pub fn pong(request_id: u32, echo_timestamp_ms: u64, server_timestamp_ms: u64) -> Self {
        Self::neu(
            request_id,
            RelaisPayload::Pong(PongMessage {
                echo_timestamp_ms,
                server_timestamp_ms,
            }),
        )
    }

    /// Erstellt eine Fehler-Antwort
    pub fn fehler(request_id: u32, code: FehlerCode, message: impl Into<String>) -> Self {
        Self::neu(
            request_id,
            RelaisPayload::Fehler(FehlerAntwort {
                code,
                message: message.into(),
            }),
        )
    }

    /// Erstellt eine Zustellung (server-initiiert, request_id 0)
    pub fn zustellung(
        von: impl Into<String>,
        gruppe: Option<String>,
        nutzlast: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self::neu(
            0,
            RelaisPayload::Zustellung(Zustellung {
                von: von.into(),
                gruppe,
                nutzlast,
            }),
        )
    }
}
