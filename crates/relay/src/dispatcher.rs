//! Relais-Dispatcher – routet RelaisNachrichten an die richtige Behandlung
//!
//! Der Dispatcher empfaengt Nachrichten von einer ClientVerbindung,
//! prueft den Authentifizierungszustand und gibt die Antwort zurueck.
//!
//! ## Zustandspruefung
//! - `Login` und `Verbinden` nur solange die Verbindung unauthentifiziert ist
//! - `Nachricht` und `DuressMeldung` nur danach

use std::net::SocketAddr;
use std::sync::Arc;

use deaddrop_auth::{AnmeldeAusgang, Anmeldung, AuthError};
use deaddrop_core::types::Kennung;
use deaddrop_db::repository::{BedrohungsRepository, GruppenRepository, KontoRepository};
use deaddrop_protocol::control::{
    DuressMeldungResponse, FehlerCode, LoginResponse, RelaisNachricht, RelaisPayload,
    VerbundenResponse,
};
use deaddrop_threat::GeoOrt;

use crate::zustand::RelaisZustand;

/// Kontext der aktuellen Verbindung
pub struct DispatcherContext {
    /// Peer-Adresse fuer Logs
    pub peer_addr: SocketAddr,
    /// Authentifizierte Kennung (None solange unauthentifiziert)
    pub kennung: Option<Kennung>,
}

/// Zentraler Dispatcher des Relais
pub struct RelaisDispatcher<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    state: Arc<RelaisZustand<K, G, B>>,
}

impl<K, G, B> RelaisDispatcher<K, G, B>
where
    K: KontoRepository + 'static,
    G: GruppenRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<RelaisZustand<K, G, B>>) -> Self {
        Self { state }
    }

    /// Verarbeitet eine eingehende Nachricht und gibt die Antwort zurueck
    ///
    /// `None` bedeutet: keine Antwort senden (fire-and-forget Pfade).
    pub async fn dispatch(
        &self,
        nachricht: RelaisNachricht,
        ctx: &mut DispatcherContext,
    ) -> Option<RelaisNachricht> {
        let request_id = nachricht.request_id;

        match nachricht.payload {
            // ---------------------------------------------------------------
            // Authentifizierung
            // ---------------------------------------------------------------
            RelaisPayload::Login(req) => {
                if ctx.kennung.is_some() {
                    return Some(RelaisNachricht::fehler(
                        request_id,
                        FehlerCode::AlreadyLoggedIn,
                        "Already logged in.",
                    ));
                }

                match self
                    .state
                    .auth
                    .anmelden(&req.username, &req.password, req.role)
                    .await
                {
                    Ok(anmeldung) => {
                        ctx.kennung = Some(anmeldung.kennung.clone());
                        tracing::debug!(
                            peer = %ctx.peer_addr,
                            kennung = %anmeldung.kennung,
                            "Verbindung authentifiziert (Login)"
                        );
                        Some(login_antwort(request_id, anmeldung))
                    }
                    Err(AuthError::UngueltigeAnmeldedaten) => Some(RelaisNachricht::fehler(
                        request_id,
                        FehlerCode::InvalidCredentials,
                        AuthError::UngueltigeAnmeldedaten.to_string(),
                    )),
                    Err(e) => {
                        tracing::error!(peer = %ctx.peer_addr, fehler = %e, "Login-Fehler");
                        Some(RelaisNachricht::fehler(
                            request_id,
                            FehlerCode::InternalError,
                            "Internal server error.",
                        ))
                    }
                }
            }

            RelaisPayload::Verbinden(req) => {
                if ctx.kennung.is_some() {
                    return Some(RelaisNachricht::fehler(
                        request_id,
                        FehlerCode::AlreadyLoggedIn,
                        "Already logged in.",
                    ));
                }

                match self.state.auth.validieren(&req.session_token) {
                    Ok(anspruch) => {
                        ctx.kennung = Some(anspruch.kennung.clone());
                        tracing::debug!(
                            peer = %ctx.peer_addr,
                            kennung = %anspruch.kennung,
                            "Verbindung authentifiziert (Token)"
                        );
                        Some(RelaisNachricht::neu(
                            request_id,
                            RelaisPayload::Verbunden(VerbundenResponse {
                                username: anspruch.kennung.0,
                            }),
                        ))
                    }
                    Err(e) => {
                        tracing::debug!(peer = %ctx.peer_addr, fehler = %e, "Token abgelehnt");
                        Some(RelaisNachricht::fehler(
                            request_id,
                            FehlerCode::NotAuthenticated,
                            "Session invalid or expired.",
                        ))
                    }
                }
            }

            // ---------------------------------------------------------------
            // Keepalive
            // ---------------------------------------------------------------
            RelaisPayload::Ping(ping) => {
                let server_ts = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis() as u64;
                Some(RelaisNachricht::pong(request_id, ping.timestamp_ms, server_ts))
            }

            RelaisPayload::Pong(_) => {
                tracing::trace!("Pong empfangen (RTT-Messung)");
                None
            }

            // ---------------------------------------------------------------
            // Authentifizierung erfordernde Nachrichten
            // ---------------------------------------------------------------
            RelaisPayload::Nachricht(umschlag) => {
                let kennung = match &ctx.kennung {
                    Some(k) => k.clone(),
                    None => {
                        return Some(nicht_authentifiziert(request_id));
                    }
                };

                // Fire-and-forget: der Absender bekommt keine Bestaetigung
                // und erfaehrt nichts ueber nicht verbundene Empfaenger
                self.state.router.route(&kennung, umschlag).await;
                None
            }

            RelaisPayload::DuressMeldung(req) => {
                let kennung = match &ctx.kennung {
                    Some(k) => k.clone(),
                    None => {
                        return Some(nicht_authentifiziert(request_id));
                    }
                };

                let ort = req.ort.map(|o| GeoOrt { lat: o.lat, lon: o.lon });
                self.state.melder.melden(kennung, ort);

                Some(RelaisNachricht::neu(
                    request_id,
                    RelaisPayload::DuressMeldungOk(DuressMeldungResponse { success: true }),
                ))
            }

            // ---------------------------------------------------------------
            // Server->Client Nachrichten vom Client sind Protokollfehler
            // ---------------------------------------------------------------
            RelaisPayload::LoginResponse(_)
            | RelaisPayload::Verbunden(_)
            | RelaisPayload::Zustellung(_)
            | RelaisPayload::DuressMeldungOk(_)
            | RelaisPayload::Fehler(_) => {
                tracing::warn!(
                    peer = %ctx.peer_addr,
                    request_id,
                    "Unerwartete Server->Client Nachricht vom Client empfangen"
                );
                Some(RelaisNachricht::fehler(
                    request_id,
                    FehlerCode::InvalidRequest,
                    "Unexpected message.",
                ))
            }
        }
    }

    /// Bereinigt die Ressourcen einer Verbindung beim Trennen
    pub fn verbindung_bereinigen(&self, kennung: &Kennung) {
        self.state.register.entfernen(kennung);
        tracing::debug!(kennung = %kennung, "Verbindungs-Ressourcen bereinigt");
    }
}

/// Baut die Wire-Antwort auf eine erfolgreiche Anmeldung
///
/// Hier kollabiert der Duress-Ausgang in die Normalform: beide Arme
/// erzeugen exakt dieselben Felder und Werte. Nur die einmalige
/// Erstanmeldungs-Offenlegung setzt `firstLogin`/`duressPassword`.
fn login_antwort(request_id: u32, anmeldung: Anmeldung) -> RelaisNachricht {
    let (first_login, duress_password) = match anmeldung.ausgang {
        AnmeldeAusgang::Erstanmeldung { duress_passwort } => (true, Some(duress_passwort)),
        AnmeldeAusgang::Normal | AnmeldeAusgang::Duress => (false, None),
    };

    RelaisNachricht::neu(
        request_id,
        RelaisPayload::LoginResponse(LoginResponse {
            username: anmeldung.kennung.0,
            session_token: anmeldung.credential.token,
            expires_at: anmeldung.credential.laeuft_ab.timestamp(),
            first_login,
            duress_password,
        }),
    )
}

fn nicht_authentifiziert(request_id: u32) -> RelaisNachricht {
    RelaisNachricht::fehler(
        request_id,
        FehlerCode::NotAuthenticated,
        "Not authenticated.",
    )
}
