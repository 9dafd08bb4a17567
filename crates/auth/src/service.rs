//! Auth-Engine – Login-Zustandsmaschine mit Duress-Erkennung
//!
//! Jeder Anmeldeversuch durchlaeuft genau eine der vier Endstationen:
//!
//! ```text
//! Unauthentifiziert -> Validierung -> { Abgelehnt
//!                                     | DuressGewaehrt
//!                                     | Erstanmeldung (Offenlegung)
//!                                     | NormalGewaehrt }
//! ```
//!
//! Alle Stationen sind terminal; Wiederholungen entscheidet der Aufrufer.
//! Harte Invariante: `DuressGewaehrt` und `NormalGewaehrt` muessen fuer
//! jeden Beobachter ausser der Client-Software selbst ununterscheidbar
//! sein – das Ausgangs-Flag existiert nur im Prozess und wird nie in die
//! Wire-Antwort serialisiert.

use std::sync::Arc;

use chrono::Utc;
use deaddrop_core::types::{Kennung, Rolle};
use deaddrop_db::{models::KontoUpdate, repository::{BedrohungsRepository, KontoRepository}};
use deaddrop_threat::DuressMelder;

use crate::{
    duress::DuressVergabe,
    error::{AuthError, AuthResult},
    password::{passwort_hashen, passwort_verifizieren},
    token::{SitzungsCredential, SitzungsPraeger, TokenAnspruch},
};

/// Ausgang eines erfolgreichen Anmeldeversuchs
///
/// `Duress` traegt bewusst keine weiteren Daten: gegenueber `Normal` darf
/// sich nichts unterscheiden, was jemals einen Serialisierungspfad erreicht.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnmeldeAusgang {
    /// Regulaere Anmeldung mit Primaerpasswort
    Normal,
    /// Duress-Passwort erkannt; Alarm laeuft verdeckt
    Duress,
    /// Erste Anmeldung: einmalige Offenlegung des frischen Duress-Passworts
    Erstanmeldung {
        /// Der Klartext – der einzige Moment, in dem er existiert
        duress_passwort: String,
    },
}

/// Ergebnis eines erfolgreichen Anmeldeversuchs
#[derive(Debug, Clone)]
pub struct Anmeldung {
    /// Kennung in der kanonischen Schreibweise des Stores
    pub kennung: Kennung,
    pub rolle: Rolle,
    pub ausgang: AnmeldeAusgang,
    pub credential: SitzungsCredential,
}

/// Auth-Engine – zentraler Einstiegspunkt fuer alle Anmeldevorgaenge
pub struct AuthService<K, B> {
    konten: Arc<K>,
    praeger: Arc<SitzungsPraeger>,
    vergabe: Arc<DuressVergabe>,
    melder: DuressMelder<B>,
}

impl<K, B> AuthService<K, B>
where
    K: KontoRepository + 'static,
    B: BedrohungsRepository + 'static,
{
    /// Erstellt eine neue Auth-Engine
    pub fn neu(
        konten: Arc<K>,
        praeger: Arc<SitzungsPraeger>,
        vergabe: Arc<DuressVergabe>,
        melder: DuressMelder<B>,
    ) -> Self {
        Self {
            konten,
            praeger,
            vergabe,
            melder,
        }
    }

    /// Fuehrt einen Anmeldeversuch durch
    ///
    /// Reihenfolge der Pruefungen:
    /// 1. Konto laden (case-insensitiv) und Rolle pruefen – beide
    ///    Fehlschlaege ergeben dieselbe generische Ablehnung.
    /// 2. Geheimnis gegen den Duress-Hash pruefen.
    /// 3. Geheimnis gegen den Primaer-Hash pruefen.
    /// 4. Bei gesetztem Erstanmeldungs-Flag: Duress-Passwort vergeben
    ///    (compare-and-swap; der Verlierer eines Rennens faellt auf
    ///    `Normal` zurueck).
    pub async fn anmelden(
        &self,
        kennung: &str,
        geheimnis: &str,
        rolle: Rolle,
    ) -> AuthResult<Anmeldung> {
        let konto = match self.konten.finde(kennung).await? {
            Some(k) => k,
            None => {
                tracing::warn!(kennung = %kennung, "Anmeldung mit unbekannter Kennung");
                return Err(AuthError::UngueltigeAnmeldedaten);
            }
        };

        if konto.rolle != rolle {
            // Bewusst dieselbe Ablehnung wie bei unbekannter Kennung
            tracing::warn!(kennung = %konto.kennung, "Anmeldung am falschen Portal");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        // Duress-Pruefung VOR dem Primaerpasswort
        if let Some(ref duress_hash) = konto.duress_hash {
            if passwort_verifizieren(geheimnis, duress_hash)? {
                let credential = self.praeger.praegen(&konto.kennung, konto.rolle)?;
                self.melder.melden(konto.kennung.clone(), None);
                self.letzten_login_vermerken(&konto.kennung).await;
                return Ok(Anmeldung {
                    kennung: konto.kennung,
                    rolle: konto.rolle,
                    ausgang: AnmeldeAusgang::Duress,
                    credential,
                });
            }
        }

        if !passwort_verifizieren(geheimnis, &konto.passwort_hash)? {
            tracing::warn!(kennung = %konto.kennung, "Fehlgeschlagener Anmeldeversuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        if konto.erstanmeldung {
            let klartext = self.vergabe.generieren();
            let duress_hash = passwort_hashen(&klartext)?;

            if self
                .konten
                .erstanmeldung_abschliessen(konto.kennung.als_str(), &duress_hash)
                .await?
            {
                let credential = self.praeger.praegen(&konto.kennung, konto.rolle)?;
                self.letzten_login_vermerken(&konto.kennung).await;
                tracing::info!(
                    kennung = %konto.kennung,
                    "Erstanmeldung abgeschlossen, Duress-Passwort vergeben"
                );
                return Ok(Anmeldung {
                    kennung: konto.kennung,
                    rolle: konto.rolle,
                    ausgang: AnmeldeAusgang::Erstanmeldung {
                        duress_passwort: klartext,
                    },
                    credential,
                });
            }
            // Rennen verloren: ein paralleler Versuch hat bereits vergeben.
            // Dieser Versuch wird zur regulaeren Anmeldung.
            tracing::debug!(
                kennung = %konto.kennung,
                "Erstanmeldungs-Vergabe anderweitig abgeschlossen"
            );
        }

        let credential = self.praeger.praegen(&konto.kennung, konto.rolle)?;
        self.letzten_login_vermerken(&konto.kennung).await;
        tracing::info!(kennung = %konto.kennung, rolle = %konto.rolle, "Anmeldung erfolgreich");

        Ok(Anmeldung {
            kennung: konto.kennung,
            rolle: konto.rolle,
            ausgang: AnmeldeAusgang::Normal,
            credential,
        })
    }

    /// Prueft ein Sitzungs-Token und gibt die Anspruchsdaten zurueck
    pub fn validieren(&self, token: &str) -> AuthResult<TokenAnspruch> {
        self.praeger.pruefen(token)
    }

    /// Vermerkt den letzten Login; Fehler schlagen nie auf die Anmeldung durch
    async fn letzten_login_vermerken(&self, kennung: &Kennung) {
        let patch = KontoUpdate {
            letzter_login: Some(Utc::now()),
            ..Default::default()
        };
        if let Err(e) = self.konten.aktualisieren(kennung.als_str(), patch).await {
            tracing::warn!(kennung = %kennung, fehler = %e, "Letzter Login nicht vermerkt");
        }
    }
}
