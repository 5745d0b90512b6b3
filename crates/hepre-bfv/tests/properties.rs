//! Property-based tests for encoding and encryption

use std::sync::OnceLock;

use hepre_bfv::{
    BatchEncoder, BfvContext, BfvPublicKey, BfvSecretKey, ParameterSet, decrypt, encrypt,
};
use proptest::prelude::*;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fn context() -> &'static BfvContext {
    static CTX: OnceLock<BfvContext> = OnceLock::new();
    CTX.get_or_init(|| {
        BfvContext::new(ParameterSet::Pn11Qp54.parameters().expect("preset"))
            .expect("context")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: decode(encode(x)) == x for any payload that fits
    #[test]
    fn prop_byte_encoding_roundtrip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let encoder = BatchEncoder::new(context());
        let pt = encoder.encode_bytes(&data).unwrap();
        prop_assert_eq!(encoder.decode_bytes(&pt), data);
    }

    /// Property: slot values below t survive encoding unchanged
    #[test]
    fn prop_slot_encoding_roundtrip(values in prop::collection::vec(0u64..67084289, 1..64)) {
        let encoder = BatchEncoder::new(context());
        let slots = encoder.decode(&encoder.encode(&values).unwrap());
        prop_assert_eq!(&slots[..values.len()], &values[..]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Property: decrypt(encrypt(x)) == x
    #[test]
    fn prop_encrypt_decrypt_roundtrip(
        data in prop::collection::vec(any::<u8>(), 1..512),
        seed in any::<u64>(),
    ) {
        let ctx = context();
        let encoder = BatchEncoder::new(ctx);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let sk = BfvSecretKey::generate(ctx, &mut rng);
        let pk = BfvPublicKey::generate(ctx, &sk, &mut rng).unwrap();

        let ct = encrypt(ctx, &pk, &encoder.encode_bytes(&data).unwrap(), &mut rng).unwrap();
        prop_assert_eq!(encoder.decode_bytes(&decrypt(ctx, &sk, &ct).unwrap()), data);
    }
}
