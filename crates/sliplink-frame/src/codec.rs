use bytes::{BufMut, Bytes, BytesMut};

/// Frame delimiter, written before and after every frame.
pub const FRAME_END: u8 = 0xC0;

/// Escape prefix.
pub const ESC: u8 = 0xDB;

/// Follows [`ESC`] to stand for a literal [`FRAME_END`].
pub const ESC_END: u8 = 0xDC;

/// Follows [`ESC`] to stand for a literal [`ESC`].
pub const ESC_ESC: u8 = 0xDD;

/// Exact number of bytes [`encode_frame`] appends for `datagram`.
pub fn encoded_len(datagram: &[u8]) -> usize {
    let escaped = datagram
        .iter()
        .filter(|&&b| b == FRAME_END || b == ESC)
        .count();
    datagram.len() + escaped + 2
}

/// Encode a datagram into a delimited frame, appending it to `dst`.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────────────────────────┬──────┐
/// │ 0xC0 │ payload, 0xDB -> DB DD, 0xC0 -> DB DC │ 0xC0 │
/// └──────┴──────────────────────────────────────┴──────┘
/// ```
///
/// Escaping `ESC` before `FRAME_END` keeps the inserted escape bytes from being
/// escaped a second time; doing both in one pass over the input is equivalent.
pub fn encode_frame(datagram: &[u8], dst: &mut BytesMut) {
    dst.reserve(encoded_len(datagram));
    dst.put_u8(FRAME_END);
    for &byte in datagram {
        match byte {
            ESC => dst.put_slice(&[ESC, ESC_ESC]),
            FRAME_END => dst.put_slice(&[ESC, ESC_END]),
            other => dst.put_u8(other),
        }
    }
    dst.put_u8(FRAME_END);
}

/// Encode a datagram into a newly allocated frame.
pub fn encode(datagram: &[u8]) -> Bytes {
    let mut dst = BytesMut::with_capacity(encoded_len(datagram));
    encode_frame(datagram, &mut dst);
    dst.freeze()
}

/// Undo byte stuffing on the body of one frame (delimiters already removed).
///
/// Applies two whole-buffer substitutions, in the reverse order of encoding:
/// `DB DC` becomes `C0`, then `DB DD` becomes `DB`. Each substitution scans
/// left to right without overlap.
///
/// Escape sequences are not validated. A trailing lone `DB`, or `DB` followed
/// by anything other than `DC`/`DD`, is passed through unchanged. Peers that
/// emit such bytes are out of protocol and their frames are delivered as-is;
/// tightening this would change what upstream layers receive.
pub fn unescape(frame: &[u8]) -> Bytes {
    let ends_restored = replace_pair(frame, [ESC, ESC_END], FRAME_END);
    replace_pair(&ends_restored, [ESC, ESC_ESC], ESC).freeze()
}

fn replace_pair(src: &[u8], pair: [u8; 2], with: u8) -> BytesMut {
    let mut out = BytesMut::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        if src[i] == pair[0] && src.get(i + 1) == Some(&pair[1]) {
            out.put_u8(with);
            i += 2;
        } else {
            out.put_u8(src[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_vec(datagram: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(datagram, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn test_encode_plain_payload() {
        assert_eq!(encode_vec(b"hello"), b"\xC0hello\xC0");
    }

    #[test]
    fn test_encode_empty_payload() {
        assert_eq!(encode_vec(b""), vec![FRAME_END, FRAME_END]);
    }

    #[test]
    fn test_encode_escapes_special_bytes() {
        let datagram = [0x45, 0x00, 0xC0, 0xDB, 0x01];
        assert_eq!(
            encode_vec(&datagram),
            vec![0xC0, 0x45, 0x00, 0xDB, 0xDC, 0xDB, 0xDD, 0x01, 0xC0]
        );
    }

    #[test]
    fn test_encode_does_not_double_escape() {
        // An escaped ESC must not have its DD touched, nor its DB re-escaped.
        assert_eq!(encode_vec(&[ESC, FRAME_END]), vec![0xC0, 0xDB, 0xDD, 0xDB, 0xDC, 0xC0]);
        assert_eq!(encode_vec(&[ESC, ESC_END]), vec![0xC0, 0xDB, 0xDD, 0xDC, 0xC0]);
    }

    #[test]
    fn test_encode_appends_to_existing_buffer() {
        let mut buf = BytesMut::from(&b"prefix"[..]);
        encode_frame(b"x", &mut buf);
        assert_eq!(buf.as_ref(), b"prefix\xC0x\xC0");
    }

    #[test]
    fn test_encode_allocates_exact_frame() {
        let frame = encode(&[0xC0, 0x01]);
        assert_eq!(frame.as_ref(), &[0xC0, 0xDB, 0xDC, 0x01, 0xC0]);
    }

    #[test]
    fn test_encoded_len_matches_output() {
        for datagram in [&b""[..], b"abc", &[0xC0, 0xDB, 0xC0], &[0xDB; 7]] {
            assert_eq!(encoded_len(datagram), encode_vec(datagram).len());
        }
    }

    #[test]
    fn test_unescape_reverses_stuffing() {
        let body = [0x45, 0x00, 0xDB, 0xDC, 0xDB, 0xDD, 0x01];
        assert_eq!(unescape(&body).as_ref(), &[0x45, 0x00, 0xC0, 0xDB, 0x01]);
    }

    #[test]
    fn test_unescape_passes_unknown_escape_through() {
        assert_eq!(unescape(&[0xDB, 0x41]).as_ref(), &[0xDB, 0x41]);
    }

    #[test]
    fn test_unescape_keeps_trailing_escape() {
        assert_eq!(unescape(&[0x01, 0xDB]).as_ref(), &[0x01, 0xDB]);
    }

    #[test]
    fn test_unescape_applies_substitutions_in_sequence() {
        // First pass turns DB DC into C0, leaving a lone DB in front of it.
        assert_eq!(unescape(&[0xDB, 0xDB, 0xDC]).as_ref(), &[0xDB, 0xC0]);
        // DC after an escaped ESC is not re-read as an escape.
        assert_eq!(unescape(&[0xDB, 0xDD, 0xDC]).as_ref(), &[0xDB, 0xDC]);
    }

    #[test]
    fn test_unescape_inverts_encode_vec() {
        let samples: [&[u8]; 5] = [
            b"",
            b"plain",
            &[0xC0],
            &[0xDB],
            &[0xDB, 0xDC, 0xDB, 0xDD, 0xC0, 0xC0, 0xDB],
        ];
        for datagram in samples {
            let wire = encode_vec(datagram);
            let body = &wire[1..wire.len() - 1];
            assert_eq!(unescape(body).as_ref(), datagram);
        }
    }
}
