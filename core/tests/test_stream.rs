#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use owo_core::{
        constants::{HEADER_LEN_V1, SEAL_OVERHEAD},
        crypto::{CryptoError, KeyPair},
        headers::{ChunkSize, HeaderError},
        stream::{DecryptReader, DecryptState, EncryptReader, Pull},
        types::{ErrorKind, StreamError},
    };

    fn cs(n: u32) -> ChunkSize {
        ChunkSize::new(n).unwrap()
    }

    /// Drain a transform with a fixed pull size.
    fn drain<P: Pull>(p: &mut P, pull_len: usize) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; pull_len];
        loop {
            let n = p.pull(&mut buf)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    fn encrypt(kp: &KeyPair, data: &[u8], chunk: u32) -> Vec<u8> {
        let mut enc = EncryptReader::with_chunk_size(kp.public().clone(), data, cs(chunk));
        drain(&mut enc, 4096).unwrap()
    }

    fn decrypt(kp: &KeyPair, wire: &[u8]) -> Result<Vec<u8>, StreamError> {
        let mut dec = DecryptReader::from_key_pair(kp, wire);
        drain(&mut dec, 4096)
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    // --- Round trip ---

    #[test]
    fn roundtrip_various_sizes() {
        let kp = KeyPair::generate();
        for (len, chunk) in [(0, 4), (1, 1), (3, 4), (4, 4), (5, 4), (1000, 7), (65_536, 16_384)] {
            let data = pattern(len);
            let wire = encrypt(&kp, &data, chunk);
            assert_eq!(decrypt(&kp, &wire).unwrap(), data, "len {len} chunk {chunk}");
        }
    }

    #[test]
    fn roundtrip_with_derived_public_key() {
        let kp = KeyPair::generate();
        let data = pattern(300);
        let wire = encrypt(&kp, &data, 64);
        let mut dec = DecryptReader::new(&kp.secret_bytes(), &wire[..]);
        assert_eq!(drain(&mut dec, 17).unwrap(), data);
    }

    #[test]
    fn roundtrip_with_explicit_public_key() {
        let kp = KeyPair::generate();
        let data = pattern(300);
        let wire = encrypt(&kp, &data, 64);
        let mut dec = DecryptReader::with_public_key(&kp.public_bytes(), &kp.secret_bytes(), &wire[..]);
        assert_eq!(drain(&mut dec, 64).unwrap(), data);
    }

    #[test]
    fn decrypt_over_encrypt_chain() {
        let kp = KeyPair::generate();
        let data = pattern(10_000);
        let enc = EncryptReader::with_chunk_size(kp.public().clone(), &data[..], cs(333));
        let mut dec = DecryptReader::from_key_pair(&kp, enc);
        let mut out = Vec::new();
        dec.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    // --- Framing ---

    #[test]
    fn hello_world_chunks_four_four_three() {
        let kp = KeyPair::generate();
        let wire = encrypt(&kp, b"HELLO WORLD", 4);
        assert_eq!(&wire[..HEADER_LEN_V1], &[0x4F, 0x77, 0x4F, 0x31, 0, 0, 0, 4]);
        assert_eq!(wire.len(), HEADER_LEN_V1 + 3 * SEAL_OVERHEAD + 11);

        let mut dec = DecryptReader::from_key_pair(&kp, &wire[..]);
        let mut buf = [0u8; 64];
        let mut pieces = Vec::new();
        loop {
            let n = dec.pull(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            pieces.push(buf[..n].to_vec());
        }
        assert_eq!(pieces, vec![b"HELL".to_vec(), b"O WO".to_vec(), b"RLD".to_vec()]);
        assert_eq!(dec.counters().chunks, 3);
    }

    #[test]
    fn no_trailing_chunk_on_exact_multiple() {
        let kp = KeyPair::generate();
        let wire = encrypt(&kp, b"ABCDEFGH", 4);
        assert_eq!(wire.len(), HEADER_LEN_V1 + 2 * (4 + SEAL_OVERHEAD));
    }

    #[test]
    fn empty_input_is_header_only() {
        let kp = KeyPair::generate();
        let wire = encrypt(&kp, b"", 4);
        assert_eq!(wire.len(), HEADER_LEN_V1);
        assert!(decrypt(&kp, &wire).unwrap().is_empty());
    }

    #[test]
    fn ciphertext_is_randomized() {
        let kp = KeyPair::generate();
        let a = encrypt(&kp, b"same input", 4);
        let b = encrypt(&kp, b"same input", 4);
        assert_eq!(a[..HEADER_LEN_V1], b[..HEADER_LEN_V1]);
        assert_ne!(a, b);
    }

    // --- Authentication ---

    #[test]
    fn tamper_any_chunk_bit_fails_authentication() {
        let kp = KeyPair::generate();
        let wire = encrypt(&kp, b"HELLO WORLD", 4);
        for byte in HEADER_LEN_V1..wire.len() {
            for bit in 0..8 {
                let mut bad = wire.clone();
                bad[byte] ^= 1 << bit;
                let err = decrypt(&kp, &bad).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::AuthenticationFailed, "byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn tamper_header_is_rejected() {
        let kp = KeyPair::generate();
        let wire = encrypt(&kp, b"HELLO WORLD", 4);
        // Tag bytes and the low byte of the chunk size.
        for byte in [0, 1, 2, 3, 7] {
            for bit in 0..8 {
                let mut bad = wire.clone();
                bad[byte] ^= 1 << bit;
                assert!(decrypt(&kp, &bad).is_err(), "byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn wrong_private_key_is_rejected() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let wire = encrypt(&kp, b"secret", 16);
        let mut dec = DecryptReader::new(&other.secret_bytes(), &wire[..]);
        let err = drain(&mut dec, 64).unwrap_err();
        assert!(matches!(err, StreamError::Crypto(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn mismatched_public_key_is_rejected() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let wire = encrypt(&kp, b"secret", 16);
        let mut dec = DecryptReader::with_public_key(&other.public_bytes(), &kp.secret_bytes(), &wire[..]);
        assert_eq!(drain(&mut dec, 64).unwrap_err().kind(), ErrorKind::AuthenticationFailed);
    }

    #[test]
    fn failure_poisons_later_pulls() {
        let kp = KeyPair::generate();
        let mut wire = encrypt(&kp, b"HELLO WORLD", 4);
        let last = wire.len() - 1;
        wire[last] ^= 0x80;

        let mut dec = DecryptReader::from_key_pair(&kp, &wire[..]);
        let mut buf = [0u8; 64];
        assert_eq!(dec.pull(&mut buf).unwrap(), 4);
        assert_eq!(dec.pull(&mut buf).unwrap(), 4);
        assert_eq!(dec.pull(&mut buf).unwrap_err().kind(), ErrorKind::AuthenticationFailed);
        assert_eq!(dec.state(), DecryptState::Failed);
        assert!(matches!(dec.pull(&mut buf), Err(StreamError::Poisoned)));
        assert!(matches!(dec.pull(&mut []), Err(StreamError::Poisoned)));
    }

    #[test]
    fn truncation_inside_chunk_fails() {
        let kp = KeyPair::generate();
        let wire = encrypt(&kp, b"HELLO WORLD", 4);
        let cut = &wire[..wire.len() - 1];
        assert_eq!(decrypt(&kp, cut).unwrap_err().kind(), ErrorKind::AuthenticationFailed);
    }

    #[test]
    fn truncation_on_chunk_boundary_goes_unnoticed() {
        let kp = KeyPair::generate();
        let wire = encrypt(&kp, b"HELLO WORLD", 4);
        let cut = &wire[..HEADER_LEN_V1 + 2 * (4 + SEAL_OVERHEAD)];
        assert_eq!(decrypt(&kp, cut).unwrap(), b"HELLO WO");
    }

    #[test]
    fn short_trailing_fragment_fails() {
        let kp = KeyPair::generate();
        let mut wire = encrypt(&kp, b"HELLO WORLD", 4);
        wire.extend_from_slice(&[0u8; SEAL_OVERHEAD - 1]);
        assert_eq!(decrypt(&kp, &wire).unwrap_err().kind(), ErrorKind::AuthenticationFailed);
    }

    // --- Header handling on decrypt ---

    #[test]
    fn header_errors_surface_from_decrypt() {
        let kp = KeyPair::generate();

        let err = decrypt(&kp, b"OwO").unwrap_err();
        assert!(matches!(err, StreamError::Header(HeaderError::Truncated { have: 3, need: 8 })));

        let err = decrypt(&kp, b"OwO2\0\0\0\x04").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeaderFormat);

        let err = decrypt(&kp, b"OwO1\0\0\0\0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidChunkSize);
    }

    // --- Reader-buffer independence ---

    #[test]
    fn pull_size_does_not_change_output() {
        let kp = KeyPair::generate();
        let data = pattern(2_000);

        let mut small = EncryptReader::with_chunk_size(kp.public().clone(), &data[..], cs(100));
        let wire_small = drain(&mut small, 1).unwrap();
        let mut large = EncryptReader::with_chunk_size(kp.public().clone(), &data[..], cs(100));
        let wire_large = drain(&mut large, 1 << 16).unwrap();
        assert_eq!(wire_small.len(), wire_large.len());

        for wire in [&wire_small, &wire_large] {
            let mut a = DecryptReader::from_key_pair(&kp, &wire[..]);
            let mut b = DecryptReader::from_key_pair(&kp, &wire[..]);
            assert_eq!(drain(&mut a, 1).unwrap(), data);
            assert_eq!(drain(&mut b, 1 << 16).unwrap(), data);
        }
    }

    #[test]
    fn trickling_source_is_handled() {
        struct OneByte<'a>(&'a [u8]);
        impl Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }

        let kp = KeyPair::generate();
        let data = pattern(500);
        let mut enc = EncryptReader::with_chunk_size(kp.public().clone(), OneByte(&data), cs(64));
        let wire = drain(&mut enc, 999).unwrap();
        assert_eq!(wire.len(), HEADER_LEN_V1 + 500 + 8 * SEAL_OVERHEAD);

        let mut dec = DecryptReader::from_key_pair(&kp, OneByte(&wire));
        assert_eq!(drain(&mut dec, 999).unwrap(), data);
    }

    // --- Memory ---

    #[test]
    fn buffers_bounded_by_chunk_size() {
        let kp = KeyPair::generate();
        let chunk = cs(64);
        let bound = 4 * chunk.sealed_len() + 256;

        for len in [0, 64, 6_400, 64_000] {
            let data = pattern(len);
            let mut enc = EncryptReader::with_chunk_size(kp.public().clone(), &data[..], chunk);
            let mut wire = Vec::new();
            let mut buf = [0u8; 37];
            loop {
                let n = enc.pull(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                wire.extend_from_slice(&buf[..n]);
                assert!(enc.buffered_capacity() <= bound);
            }

            let mut dec = DecryptReader::from_key_pair(&kp, &wire[..]);
            loop {
                let n = dec.pull(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                assert!(dec.buffered_capacity() <= bound);
            }
        }
    }

    // --- Error transport through io::Read ---

    #[test]
    fn io_read_preserves_error_kind() {
        let kp = KeyPair::generate();
        let mut wire = encrypt(&kp, b"HELLO WORLD", 4);
        wire[HEADER_LEN_V1] ^= 1;

        let mut dec = DecryptReader::from_key_pair(&kp, &wire[..]);
        let mut out = Vec::new();
        let err = dec.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(StreamError::from_io(err).kind(), ErrorKind::AuthenticationFailed);
    }

    #[test]
    fn nested_error_kind_survives_stacking() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionAborted, "gone"))
            }
        }

        let kp = KeyPair::generate();
        let enc = EncryptReader::new(kp.public().clone(), Broken);
        let mut dec = DecryptReader::from_key_pair(&kp, enc);
        let err = drain(&mut dec, 64).unwrap_err();
        assert!(matches!(err, StreamError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionAborted));
    }

    #[test]
    fn stacked_decrypt_keeps_inner_auth_failure() {
        let kp = KeyPair::generate();
        let outer = KeyPair::generate();
        let mut wire = encrypt(&kp, b"HELLO WORLD", 4);
        wire[HEADER_LEN_V1 + 1] ^= 1;

        // encrypt(decrypt(tampered)) then decrypt again: the inner failure must
        // come back out unchanged.
        let inner = DecryptReader::from_key_pair(&kp, &wire[..]);
        let enc = EncryptReader::with_chunk_size(outer.public().clone(), inner, cs(4));
        let mut dec = DecryptReader::from_key_pair(&outer, enc);
        let err = drain(&mut dec, 64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    }
}
