//! Key switching tests for BFV

use hepre_bfv::{
    BatchEncoder, BfvContext, BfvPublicKey, BfvSecretKey, BfvSwitchingKey, DecompositionBaseLog,
    ParameterSet, decrypt, encrypt, key_switch,
};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fn context(set: ParameterSet) -> BfvContext {
    BfvContext::new(set.parameters().expect("preset should validate"))
        .expect("context should build")
}

#[test]
fn test_alice_to_bob_switch() {
    let ctx = context(ParameterSet::Pn11Qp54);
    let encoder = BatchEncoder::new(&ctx);
    let mut rng = ChaCha20Rng::seed_from_u64(1);

    let alice_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let alice_pk = BfvPublicKey::generate(&ctx, &alice_sk, &mut rng).expect("keygen");
    let bob_sk = BfvSecretKey::generate(&ctx, &mut rng);

    let plaintext = b"attack at dawn";
    let ct_alice = encrypt(
        &ctx,
        &alice_pk,
        &encoder.encode_bytes(plaintext).expect("encode"),
        &mut rng,
    )
    .expect("Encryption should succeed");

    // Alice can read her own ciphertext
    assert_eq!(
        encoder.decode_bytes(&decrypt(&ctx, &alice_sk, &ct_alice).expect("decrypt")),
        plaintext
    );

    let swk = BfvSwitchingKey::generate(
        &ctx,
        &alice_sk,
        &bob_sk,
        ctx.params().decomposition_base_log(),
        &mut rng,
    )
    .expect("Switching key generation should succeed");
    let ct_bob = key_switch(&ctx, &ct_alice, &swk).expect("switch");

    assert_eq!(
        encoder.decode_bytes(&decrypt(&ctx, &bob_sk, &ct_bob).expect("decrypt")),
        plaintext,
        "Bob should be able to decrypt the switched ciphertext"
    );
}

#[test]
fn test_rns_only_switch_on_two_moduli() {
    let ctx = context(ParameterSet::Pn12Qp109);
    let encoder = BatchEncoder::new(&ctx);
    let mut rng = ChaCha20Rng::seed_from_u64(2);

    let alice_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let alice_pk = BfvPublicKey::generate(&ctx, &alice_sk, &mut rng).expect("keygen");
    let bob_sk = BfvSecretKey::generate(&ctx, &mut rng);

    let values: Vec<u64> = (0..ctx.slot_count() as u64).map(|i| i * 16_381 % 67084289).collect();
    let ct = encrypt(&ctx, &alice_pk, &encoder.encode(&values).expect("encode"), &mut rng)
        .expect("Encryption should succeed");

    let swk = BfvSwitchingKey::generate(
        &ctx,
        &alice_sk,
        &bob_sk,
        DecompositionBaseLog::RNS_ONLY,
        &mut rng,
    )
    .expect("Switching key generation should succeed");
    assert_eq!(swk.level_count(), 2);

    let switched = key_switch(&ctx, &ct, &swk).expect("switch");
    assert_eq!(
        encoder.decode(&decrypt(&ctx, &bob_sk, &switched).expect("decrypt")),
        values
    );
}

#[test]
fn test_two_hop_switch() {
    let ctx = context(ParameterSet::Pn11Qp54);
    let encoder = BatchEncoder::new(&ctx);
    let mut rng = ChaCha20Rng::seed_from_u64(3);

    let alice_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let alice_pk = BfvPublicKey::generate(&ctx, &alice_sk, &mut rng).expect("keygen");
    let bob_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let carol_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let base_log = ctx.params().decomposition_base_log();

    let plaintext = vec![0x42u8; 32];
    let ct_alice = encrypt(
        &ctx,
        &alice_pk,
        &encoder.encode_bytes(&plaintext).expect("encode"),
        &mut rng,
    )
    .expect("Encryption should succeed");

    let ab = BfvSwitchingKey::generate(&ctx, &alice_sk, &bob_sk, base_log, &mut rng)
        .expect("A->B key");
    let bc = BfvSwitchingKey::generate(&ctx, &bob_sk, &carol_sk, base_log, &mut rng)
        .expect("B->C key");

    let ct_bob = key_switch(&ctx, &ct_alice, &ab).expect("first hop");
    let ct_carol = key_switch(&ctx, &ct_bob, &bc).expect("second hop");

    assert_eq!(
        encoder.decode_bytes(&decrypt(&ctx, &carol_sk, &ct_carol).expect("decrypt")),
        plaintext,
        "Carol should be able to decrypt after 2 hops"
    );
}

#[test]
fn test_switching_key_serialization() {
    let ctx = context(ParameterSet::Pn11Qp54);
    let encoder = BatchEncoder::new(&ctx);
    let mut rng = ChaCha20Rng::seed_from_u64(4);

    let alice_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let alice_pk = BfvPublicKey::generate(&ctx, &alice_sk, &mut rng).expect("keygen");
    let bob_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let swk = BfvSwitchingKey::generate(
        &ctx,
        &alice_sk,
        &bob_sk,
        ctx.params().decomposition_base_log(),
        &mut rng,
    )
    .expect("keygen");

    let restored = BfvSwitchingKey::from_bytes(&swk.to_bytes(&ctx), &ctx)
        .expect("Deserialization should succeed");
    assert_eq!(restored, swk);

    let ct = encrypt(
        &ctx,
        &alice_pk,
        &encoder.encode_bytes(b"restored").expect("encode"),
        &mut rng,
    )
    .expect("encrypt");
    let switched = key_switch(&ctx, &ct, &restored).expect("switch");
    assert_eq!(
        encoder.decode_bytes(&decrypt(&ctx, &bob_sk, &switched).expect("decrypt")),
        b"restored"
    );
}

#[test]
fn test_wrong_key_yields_garbage() {
    let ctx = context(ParameterSet::Pn11Qp54);
    let encoder = BatchEncoder::new(&ctx);
    let mut rng = ChaCha20Rng::seed_from_u64(5);

    let alice_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let alice_pk = BfvPublicKey::generate(&ctx, &alice_sk, &mut rng).expect("keygen");
    let bob_sk = BfvSecretKey::generate(&ctx, &mut rng);
    let eve_sk = BfvSecretKey::generate(&ctx, &mut rng);

    let plaintext = b"for bob only";
    let ct = encrypt(
        &ctx,
        &alice_pk,
        &encoder.encode_bytes(plaintext).expect("encode"),
        &mut rng,
    )
    .expect("encrypt");
    let swk = BfvSwitchingKey::generate(
        &ctx,
        &alice_sk,
        &bob_sk,
        ctx.params().decomposition_base_log(),
        &mut rng,
    )
    .expect("keygen");
    let ct_bob = key_switch(&ctx, &ct, &swk).expect("switch");

    let eve_view = encoder.decode_bytes(&decrypt(&ctx, &eve_sk, &ct_bob).expect("decrypt"));
    assert_ne!(eve_view, plaintext, "Eve should not recover Bob's plaintext");

    // A key for a different source does not apply either
    let wrong_source = key_switch(&ctx, &ct_bob, &swk).expect("switch");
    assert_ne!(
        encoder.decode_bytes(&decrypt(&ctx, &bob_sk, &wrong_source).expect("decrypt")),
        plaintext
    );
}

#[test]
fn test_coarse_decomposition_is_rejected() {
    let ctx = context(ParameterSet::Pn11Qp54);
    let mut rng = ChaCha20Rng::seed_from_u64(6);
    let a = BfvSecretKey::generate(&ctx, &mut rng);
    let b = BfvSecretKey::generate(&ctx, &mut rng);

    let result =
        BfvSwitchingKey::generate(&ctx, &a, &b, DecompositionBaseLog::RNS_ONLY, &mut rng);
    assert!(matches!(result, Err(hepre_bfv::BfvError::Decomposition(_))));
}
