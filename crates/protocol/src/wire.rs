//! Wire-Format fuer Relais-Verbindungen
//!
//! Frame-basiertes Protokoll: Laenge (u32 big-endian) + JSON-Payload.
//!
//! ```text
//! +--------+--------+--------+--------+----...----+
//! | Laenge (u32 BE), 4 Bytes          | Payload   |
//! +--------+--------+--------+--------+----...----+
//! ```
//!
//! Ein Frame mit ungueltigem JSON wird geloggt und uebersprungen statt die
//! Verbindung zu beenden: die Frame-Grenzen bleiben durch das Laengenfeld
//! bekannt, der Decoder synchronisiert sich am naechsten Frame. Nur
//! Protokollverletzungen (Frame groesser als das Limit) beenden den Stream.

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};

use crate::control::RelaisNachricht;

/// Standard-maximale Frame-Groesse (1 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Groesse des Laengen-Felds in Bytes
pub const LENGTH_FIELD_SIZE: usize = 4;

/// tokio-util Codec fuer frame-basierte Relais-Verbindungen
///
/// Implementiert `Encoder<RelaisNachricht>` und `Decoder` fuer
/// `tokio_util::codec::Framed`.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    /// Erstellt einen neuen `FrameCodec` mit Standard-Limit
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Erstellt einen `FrameCodec` mit eigenem Frame-Limit
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Gibt das konfigurierte Frame-Limit zurueck
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = RelaisNachricht;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.len() < LENGTH_FIELD_SIZE {
                return Ok(None);
            }

            let length = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

            if length > self.max_frame_size {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                        length, self.max_frame_size
                    ),
                ));
            }

            let total_size = LENGTH_FIELD_SIZE + length;
            if src.len() < total_size {
                src.reserve(total_size - src.len());
                return Ok(None);
            }

            src.advance(LENGTH_FIELD_SIZE);
            let payload = src.split_to(length);

            match serde_json::from_slice::<RelaisNachricht>(&payload) {
                Ok(nachricht) => return Ok(Some(nachricht)),
                Err(e) => {
                    // Frame verwerfen und mit dem naechsten weitermachen
                    tracing::warn!(
                        fehler = %e,
                        bytes = length,
                        "Ungueltiges JSON im Frame – Nachricht verworfen"
                    );
                    continue;
                }
            }
        }
    }
}

impl Encoder<RelaisNachricht> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: RelaisNachricht, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON-Serialisierung fehlgeschlagen: {e}"),
            )
        })?;

        if json.len() > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Nachricht zu gross: {} Bytes (Maximum: {} Bytes)",
                    json.len(),
                    self.max_frame_size
                ),
            ));
        }

        dst.reserve(LENGTH_FIELD_SIZE + json.len());
        dst.put_u32(json.len() as u32);
        dst.put_slice(&json);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hilfsfunktionen fuer direktes async Lesen/Schreiben (Test-Clients)
// ---------------------------------------------------------------------------

/// Liest einen einzelnen Frame aus einem `AsyncRead`
///
/// Anders als der Codec ueberspringt diese Funktion ungueltiges JSON nicht;
/// sie ist fuer Test-Clients gedacht, die exakt wissen was kommt.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> io::Result<RelaisNachricht>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; LENGTH_FIELD_SIZE];
    reader.read_exact(&mut len_buf).await?;
    let length = u32::from_be_bytes(len_buf) as usize;

    if length > max_frame_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Frame zu gross: {length} Bytes (Maximum: {max_frame_size} Bytes)"),
        ));
    }

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;

    serde_json::from_slice(&payload).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("JSON-Deserialisierung fehlgeschlagen: {e}"),
        )
    })
}

/// Schreibt einen einzelnen Frame in einen `AsyncWrite`
pub async fn write_frame<W>(
    writer: &mut W,
    nachricht: &RelaisNachricht,
    max_frame_size: usize,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_vec(nachricht).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("JSON-Serialisierung fehlgeschlagen: {e}"),
        )
    })?;

    if json.len() > max_frame_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Nachricht zu gross: {} Bytes (Maximum: {} Bytes)",
                json.len(),
                max_frame_size
            ),
        ));
    }

    writer.write_all(&(json.len() as u32).to_be_bytes()).await?;
    writer.write_all(&json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::RelaisPayload;

    fn test_ping(request_id: u32) -> RelaisNachricht {
        RelaisNachricht::ping(request_id, 999888777)
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(test_ping(42), &mut buf).unwrap();

        let payload_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(buf.len(), LENGTH_FIELD_SIZE + payload_len);

        let decoded = codec.decode(&mut buf).unwrap().expect("Nachricht erwartet");
        assert_eq!(decoded.request_id, 42);
        assert!(matches!(decoded.payload, RelaisPayload::Ping(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn unvollstaendiger_frame_wartet() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(test_ping(1), &mut buf).unwrap();

        let half = buf.len() / 2;
        let mut partial = buf.split_to(half);
        assert!(codec.decode(&mut partial).unwrap().is_none());
    }

    #[test]
    fn zu_grosser_frame_ist_fehler() {
        let mut codec = FrameCodec::with_max_size(100);
        let mut buf = BytesMut::new();
        buf.put_u32(200);
        buf.put_slice(&[b'x'; 200]);
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn ungueltiges_json_wird_uebersprungen() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        // Erst ein kaputter Frame, dann ein gueltiger
        let kaputt = b"{definitiv kein json";
        buf.put_u32(kaputt.len() as u32);
        buf.put_slice(kaputt);
        codec.encode(test_ping(7), &mut buf).unwrap();

        // Der Decoder verwirft den kaputten Frame und liefert den gueltigen
        let decoded = codec.decode(&mut buf).unwrap().expect("Nachricht erwartet");
        assert_eq!(decoded.request_id, 7);
        assert!(buf.is_empty());
    }

    #[test]
    fn nur_kaputte_frames_ergeben_none() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        let kaputt = b"[1,2,";
        buf.put_u32(kaputt.len() as u32);
        buf.put_slice(kaputt);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty(), "Kaputter Frame muss verbraucht sein");
    }

    #[test]
    fn mehrere_nachrichten_im_buffer() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        for i in 0..3u32 {
            codec.encode(test_ping(i), &mut buf).unwrap();
        }
        for i in 0..3u32 {
            let msg = codec.decode(&mut buf).unwrap().expect("Nachricht erwartet");
            assert_eq!(msg.request_id, i);
        }
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn async_read_write_round_trip() {
        let mut buffer: Vec<u8> = Vec::new();
        write_frame(&mut buffer, &test_ping(99), DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap();

        let mut cursor = io::Cursor::new(buffer);
        let decoded = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await.unwrap();
        assert_eq!(decoded.request_id, 99);
    }

    #[tokio::test]
    async fn async_read_lehnt_zu_grossen_frame_ab() {
        let mut buffer: Vec<u8> = Vec::new();
        buffer.extend_from_slice(&(2u32 * 1024 * 1024).to_be_bytes());

        let mut cursor = io::Cursor::new(buffer);
        assert!(read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await.is_err());
    }
}
