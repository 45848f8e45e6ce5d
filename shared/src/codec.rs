//! Length-prefixed bincode framing over a byte stream.
//!
//! Each packet is written as a `u32` little-endian payload length
//! followed by the bincode-encoded [`Packet`]. TCP gives us reliable,
//! ordered delivery; the prefix restores message boundaries.

use crate::Packet;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Upper bound on a single frame. A full snapshot of a large board is a
/// few kilobytes; anything past this is a corrupt or hostile peer.
pub const MAX_FRAME_LEN: u32 = 64 * 1024;

/// Writes one framed packet to the stream.
pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> io::Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    let payload =
        bincode::serialize(packet).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let len = payload.len() as u32;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "packet exceeds maximum frame length",
        ));
    }

    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one framed packet from the stream.
///
/// Returns `Ok(None)` on a clean end-of-stream at a frame boundary,
/// which is how an orderly peer disconnect shows up.
pub async fn read_packet<R>(reader: &mut R) -> io::Result<Option<Packet>>
where
    R: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = u32::from_le_bytes(len_buf);
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame length exceeds maximum",
        ));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;

    let packet = bincode::deserialize(&payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(packet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Side;

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let mut buf = Vec::new();
        let packet = Packet::SubmitMove {
            row: 2,
            col: 0,
            side: Side::Bottom,
        };
        write_packet(&mut buf, &packet).await.unwrap();

        let mut reader = buf.as_slice();
        match read_packet(&mut reader).await.unwrap() {
            Some(Packet::SubmitMove { row, col, side }) => {
                assert_eq!(row, 2);
                assert_eq!(col, 0);
                assert_eq!(side, Side::Bottom);
            }
            other => panic!("Unexpected packet: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_frames_keep_boundaries() {
        let mut buf = Vec::new();
        write_packet(&mut buf, &Packet::RestartRequest).await.unwrap();
        write_packet(
            &mut buf,
            &Packet::PeerLeft { player_id: 9 },
        )
        .await
        .unwrap();

        let mut reader = buf.as_slice();
        assert!(matches!(
            read_packet(&mut reader).await.unwrap(),
            Some(Packet::RestartRequest)
        ));
        assert!(matches!(
            read_packet(&mut reader).await.unwrap(),
            Some(Packet::PeerLeft { player_id: 9 })
        ));
        assert!(read_packet(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_at_boundary_is_clean_close() {
        let mut reader: &[u8] = &[];
        assert!(read_packet(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_FRAME_LEN + 1).to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);

        let mut reader = buf.as_slice();
        let err = read_packet(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_truncated_payload_is_error() {
        let mut buf = Vec::new();
        write_packet(&mut buf, &Packet::RestartRequest).await.unwrap();
        buf.extend_from_slice(&8u32.to_le_bytes());
        buf.extend_from_slice(&[1, 2]); // only 2 of the promised 8 bytes

        let mut reader = buf.as_slice();
        assert!(read_packet(&mut reader).await.unwrap().is_some());
        assert!(read_packet(&mut reader).await.is_err());
    }
}
