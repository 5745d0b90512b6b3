//! Batch encoding of slot vectors
//!
//! A [`Plaintext`] holds one value per slot. The SIMD transform into a
//! plaintext polynomial happens in `fhe` at encryption time, and back at
//! decryption.
//!
//! Byte payloads put `b + 1` in each slot and leave unused slots at zero.
//! Decoding trims the zero tail, which makes the byte round trip exact even
//! when the payload itself ends in NUL bytes.

use crate::context::BfvContext;
use crate::error::{BfvError, BfvResult};
use crate::plaintext::Plaintext;

pub struct BatchEncoder<'a> {
    ctx: &'a BfvContext,
}

impl<'a> BatchEncoder<'a> {
    pub fn new(ctx: &'a BfvContext) -> Self {
        Self { ctx }
    }

    /// Number of values one plaintext can hold
    pub fn slot_count(&self) -> usize {
        self.ctx.slot_count()
    }

    /// Encode raw slot values, each below the plaintext modulus
    pub fn encode(&self, values: &[u64]) -> BfvResult<Plaintext> {
        let capacity = self.slot_count();
        if values.len() > capacity {
            return Err(BfvError::PayloadTooLarge {
                len: values.len(),
                capacity,
            });
        }
        let t = self.ctx.params().plaintext_modulus();
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| **v >= t) {
            return Err(BfvError::SlotOutOfRange {
                index,
                value,
                modulus: t,
            });
        }

        let mut slots = vec![0u64; capacity];
        slots[..values.len()].copy_from_slice(values);
        Ok(Plaintext { slots })
    }

    /// Recover every slot value
    pub fn decode(&self, plaintext: &Plaintext) -> Vec<u64> {
        plaintext.slots.clone()
    }

    pub fn encode_bytes(&self, bytes: &[u8]) -> BfvResult<Plaintext> {
        let values: Vec<u64> = bytes.iter().map(|&b| b as u64 + 1).collect();
        self.encode(&values)
    }

    /// Inverse of [`encode_bytes`](Self::encode_bytes). Slots that do not hold
    /// an offset byte, as after decrypting with the wrong key, are truncated
    /// to their low byte.
    pub fn decode_bytes(&self, plaintext: &Plaintext) -> Vec<u8> {
        let slots = self.decode(plaintext);
        let used = slots.iter().rposition(|&v| v != 0).map_or(0, |i| i + 1);
        slots[..used]
            .iter()
            .map(|&v| v.wrapping_sub(1) as u8)
            .collect()
    }
}
