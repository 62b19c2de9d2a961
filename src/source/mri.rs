//! MRI payload codec.
//!
//! Some remote sources serve WebP images with the RIFF header stripped and
//! the rest XOR-ed with a one-byte key. Decoding restores the header and
//! undoes the XOR.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ErrorKind, SourceError, SourceResult};

/// Content type announcing an MRI payload.
pub const MRI_CONTENT_TYPE: &str = "application/x-mri";

/// Content type of a decoded payload.
pub const WEBP_CONTENT_TYPE: &str = "image/webp";

const MRI_MAGIC: u8 = 69;
const XOR_KEY: u8 = 101;
const WEBP_PREFIX: &[u8; 7] = b"WEBPVP8";
const HEADER_LEN: usize = 15;

/// Rebuilds a WebP image from an MRI payload.
pub fn decode_mri(payload: &[u8]) -> SourceResult<Bytes> {
    if payload.first() != Some(&MRI_MAGIC) {
        return Err(SourceError::with_message(
            ErrorKind::Decode,
            "Payload is not MRI encoded",
        ));
    }
    let size = u32::try_from(payload.len() + 7).map_err(|_| {
        SourceError::with_message(ErrorKind::Decode, "MRI payload too large")
    })?;

    let mut out = BytesMut::with_capacity(payload.len() + HEADER_LEN);
    out.put_slice(b"RIFF");
    out.put_u32_le(size);
    out.put_slice(WEBP_PREFIX);
    out.extend(payload.iter().map(|b| b ^ XOR_KEY));
    Ok(out.freeze())
}

/// Produces the MRI payload for `chunk`, the bytes that follow the
/// `RIFF....WEBPVP8` prefix of a WebP stream. `chunk` must start with the
/// space that completes the `VP8 ` fourcc.
pub fn encode_mri(chunk: &[u8]) -> SourceResult<Bytes> {
    if chunk.first() != Some(&(MRI_MAGIC ^ XOR_KEY)) {
        return Err(SourceError::with_message(
            ErrorKind::Decode,
            "Chunk does not continue a VP8 fourcc",
        ));
    }
    Ok(chunk.iter().map(|b| b ^ XOR_KEY).collect::<Vec<_>>().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_restores_header() {
        let payload = [69u8, 101 ^ 1, 101 ^ 2];
        let decoded = decode_mri(&payload).unwrap();
        assert_eq!(&decoded[0..4], b"RIFF");
        assert_eq!(&decoded[4..8], &10u32.to_le_bytes());
        assert_eq!(&decoded[8..15], b"WEBPVP8");
        assert_eq!(&decoded[15..], &[b' ', 1, 2]);
    }

    #[test]
    fn test_decode_rejects_plain_payload() {
        let err = decode_mri(b"\x89PNG").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
        assert!(decode_mri(&[]).is_err());
    }

    #[test]
    fn test_encode_is_inverse_of_decode() {
        let chunk = b" some vp8 bitstream";
        let payload = encode_mri(chunk).unwrap();
        assert_eq!(payload[0], 69);
        let decoded = decode_mri(&payload).unwrap();
        assert_eq!(&decoded[HEADER_LEN..], chunk);
        assert!(encode_mri(b"no leading space").is_err());
    }
}
