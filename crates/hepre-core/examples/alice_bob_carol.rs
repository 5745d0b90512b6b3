// Publisher -> subscriber -> second subscriber re-encryption walkthrough

use hepre_core::{CryptoContext, KeyStoreManager, ReEncryptionPipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let preset = std::env::args().nth(1).unwrap_or_else(|| "PN11QP54".into());
    println!("🔐 hepre: Alice → Bob → Carol re-encryption ({preset})\n");

    let ctx = CryptoContext::initialize(&preset)?;
    let keys = KeyStoreManager::new(&ctx);
    let pipeline = ReEncryptionPipeline::new(&ctx);

    // 1. Alice publishes
    println!("1️⃣  Generating Alice's publisher keys...");
    let alice = keys.generate_publisher_keys()?;
    println!("   ✓ public key {} bytes\n", alice.public.as_bytes().len());

    // 2. Bob's keys and the Alice → Bob switching key come from one step
    println!("2️⃣  Issuing Bob's keys with an Alice → Bob switching key...");
    let bob = keys.issue_subscriber(&alice.secret)?;
    println!(
        "   ✓ switching key {} bytes ({})\n",
        bob.switching_key.as_bytes().len(),
        keys.decomposition()
    );

    // 3. Alice encrypts
    let plaintext = b"The secret is: lattices rule!";
    println!("3️⃣  Alice encrypts {:?}", String::from_utf8_lossy(plaintext));
    let ct = pipeline.encrypt_for_publisher(plaintext, &alice.public)?;
    println!("   ✓ ciphertext {} bytes, {}\n", ct.to_bytes().len(), ct.state());

    // 4. Proxy re-encrypts for Bob
    println!("4️⃣  Proxy re-encrypts for Bob...");
    let ct_bob = pipeline.re_encrypt(&ct, &bob.switching_key)?;
    let seen = pipeline.decrypt_for_subscriber(&ct_bob, &bob.key_pair.secret)?;
    println!("   ✓ Bob sees: {:?}\n", String::from_utf8_lossy(&seen));

    // 5. Bob grants Carol, proxy re-encrypts again
    println!("5️⃣  Bob issues Carol's keys; proxy re-encrypts Bob → Carol...");
    let carol = keys.issue_subscriber(&bob.key_pair.secret)?;
    let ct_carol = pipeline.re_encrypt(&ct_bob, &carol.switching_key)?;
    let seen = pipeline.decrypt_for_subscriber(&ct_carol, &carol.key_pair.secret)?;
    println!(
        "   ✓ Carol sees: {:?} (level {})\n",
        String::from_utf8_lossy(&seen),
        ct_carol.level()
    );

    // 6. Someone else gets noise, not an error
    let eve = keys.generate_subscriber_keys()?;
    let garbage = pipeline.decrypt_for_subscriber(&ct_carol, &eve.secret)?;
    println!(
        "6️⃣  Eve decrypts Carol's ciphertext: {} unrelated bytes",
        garbage.len()
    );

    Ok(())
}
