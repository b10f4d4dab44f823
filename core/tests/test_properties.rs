#[cfg(test)]
mod tests {
    use owo_core::{
        constants::{HEADER_LEN_V1, SEAL_OVERHEAD},
        crypto::KeyPair,
        headers::{decode_header, ChunkSize, HeaderV1},
        stream::{DecryptReader, EncryptReader, Pull},
    };
    use proptest::prelude::*;

    fn drain<P: Pull>(p: &mut P, pull_len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; pull_len];
        loop {
            let n = p.pull(&mut buf).unwrap();
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    fn expected_wire_len(len: usize, chunk: usize) -> usize {
        HEADER_LEN_V1 + len + len.div_ceil(chunk) * SEAL_OVERHEAD
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_roundtrip(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            chunk in 1u32..300,
            enc_pull in 1usize..512,
            dec_pull in 1usize..512,
        ) {
            let kp = KeyPair::generate();
            let cs = ChunkSize::new(chunk).unwrap();

            let mut enc = EncryptReader::with_chunk_size(kp.public().clone(), &data[..], cs);
            let wire = drain(&mut enc, enc_pull);
            prop_assert_eq!(wire.len(), expected_wire_len(data.len(), chunk as usize));

            let mut dec = DecryptReader::from_key_pair(&kp, &wire[..]);
            prop_assert_eq!(drain(&mut dec, dec_pull), data);
        }

        #[test]
        fn prop_header_roundtrip(raw in 1u32..=owo_core::constants::MAX_CHUNK_SIZE) {
            let h = HeaderV1::new(ChunkSize::new(raw).unwrap());
            prop_assert_eq!(decode_header(&h.encode()).unwrap(), h);
        }

        #[test]
        fn prop_pull_size_independent(
            data in proptest::collection::vec(any::<u8>(), 1..1024),
            chunk in 1u32..128,
            pull in 1usize..64,
        ) {
            let kp = KeyPair::generate();
            let cs = ChunkSize::new(chunk).unwrap();
            let mut enc = EncryptReader::with_chunk_size(kp.public().clone(), &data[..], cs);
            let wire = drain(&mut enc, 4096);

            let mut a = DecryptReader::from_key_pair(&kp, &wire[..]);
            let mut b = DecryptReader::from_key_pair(&kp, &wire[..]);
            prop_assert_eq!(drain(&mut a, pull), drain(&mut b, 1 << 16));
        }
    }
}
