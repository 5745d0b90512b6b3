//! Binary framing for serialized artifacts
//!
//! Every blob starts with `[kind u8][version u8][fingerprint 8B]`, followed
//! by the body. Readers check the header against the context so artifacts
//! from another parameter set are reported as a mismatch rather than
//! decoded into garbage.
//!
//! Public keys and ciphertexts carry the `fhe` serialization as their body.
//! Secret keys, switching keys and plaintexts use little-endian words.

use fhe_math::rq::traits::TryConvertFrom;
use fhe_math::rq::{Poly, Representation};

use crate::context::BfvContext;
use crate::error::{BfvError, BfvResult};
use crate::params::ParameterFingerprint;

pub(crate) const FORMAT_VERSION: u8 = 1;
pub(crate) const HEADER_LEN: usize = 2 + ParameterFingerprint::LEN;

/// Artifact type carried in the first header byte
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlobKind {
    SecretKey = 1,
    PublicKey = 2,
    SwitchingKey = 3,
    Ciphertext = 4,
    Plaintext = 5,
}

impl BlobKind {
    /// Read the kind of a serialized artifact without decoding it
    pub fn peek(bytes: &[u8]) -> BfvResult<Self> {
        let tag = bytes
            .first()
            .ok_or_else(|| BfvError::Deserialization("empty blob".to_string()))?;
        Self::try_from(*tag)
    }
}

impl TryFrom<u8> for BlobKind {
    type Error = BfvError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::SecretKey),
            2 => Ok(Self::PublicKey),
            3 => Ok(Self::SwitchingKey),
            4 => Ok(Self::Ciphertext),
            5 => Ok(Self::Plaintext),
            other => Err(BfvError::Deserialization(format!(
                "unknown blob kind {other}"
            ))),
        }
    }
}

pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new(kind: BlobKind, fingerprint: ParameterFingerprint, body_len: usize) -> Self {
        let mut buf = Vec::with_capacity(HEADER_LEN + body_len);
        buf.push(kind as u8);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&fingerprint.0);
        Self { buf }
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// Residues row by row, one row per chain modulus
    pub(crate) fn poly(&mut self, p: &Poly) {
        for &c in p.coefficients().iter() {
            self.u64(c);
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    kind: BlobKind,
}

impl<'a> Reader<'a> {
    /// Validate the header and position the reader at the body
    pub(crate) fn new(bytes: &'a [u8], kind: BlobKind, ctx: &BfvContext) -> BfvResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(BfvError::Deserialization(format!(
                "{kind:?} blob too short: {} bytes",
                bytes.len()
            )));
        }
        let found_kind = BlobKind::try_from(bytes[0])?;
        if found_kind != kind {
            return Err(BfvError::Deserialization(format!(
                "expected {kind:?} blob, found {found_kind:?}"
            )));
        }
        if bytes[1] != FORMAT_VERSION {
            return Err(BfvError::Deserialization(format!(
                "unsupported format version {}",
                bytes[1]
            )));
        }
        let mut fingerprint = [0u8; ParameterFingerprint::LEN];
        fingerprint.copy_from_slice(&bytes[2..HEADER_LEN]);
        let found = ParameterFingerprint(fingerprint);
        if found != ctx.fingerprint() {
            return Err(BfvError::ParameterMismatch {
                expected: ctx.fingerprint().to_string(),
                found: found.to_string(),
            });
        }
        Ok(Self {
            bytes,
            pos: HEADER_LEN,
            kind,
        })
    }

    fn take(&mut self, len: usize) -> BfvResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                BfvError::Deserialization(format!(
                    "{:?} blob truncated at byte {}",
                    self.kind, self.pos
                ))
            })?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> BfvResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> BfvResult<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes(raw.try_into().map_err(|_| {
            BfvError::Deserialization("invalid u32 bytes".to_string())
        })?))
    }

    pub(crate) fn u64(&mut self) -> BfvResult<u64> {
        let raw = self.take(8)?;
        Ok(u64::from_le_bytes(raw.try_into().map_err(|_| {
            BfvError::Deserialization("invalid u64 bytes".to_string())
        })?))
    }

    pub(crate) fn bytes(&mut self, len: usize) -> BfvResult<&'a [u8]> {
        self.take(len)
    }

    /// Everything after the current position
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let out = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        out
    }

    /// Read one polynomial, checking every residue against its modulus
    pub(crate) fn poly(
        &mut self,
        ctx: &BfvContext,
        representation: Representation,
    ) -> BfvResult<Poly> {
        let degree = ctx.degree();
        let moduli = ctx.params().moduli();
        let mut residues = Vec::with_capacity(moduli.len() * degree);
        for &q in moduli {
            for _ in 0..degree {
                let c = self.u64()?;
                if c >= q {
                    return Err(BfvError::Deserialization(format!(
                        "{:?} coefficient {c} out of range for modulus {q}",
                        self.kind
                    )));
                }
                residues.push(c);
            }
        }
        Ok(Poly::try_convert_from(
            residues,
            ctx.ring(),
            false,
            representation,
        )?)
    }

    /// Require the whole blob to have been consumed
    pub(crate) fn finish(self) -> BfvResult<()> {
        if self.pos != self.bytes.len() {
            return Err(BfvError::Deserialization(format!(
                "{:?} blob has {} trailing bytes",
                self.kind,
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

/// Serialized size of one polynomial
pub(crate) fn poly_len(ctx: &BfvContext) -> usize {
    ctx.params().moduli().len() * ctx.degree() * 8
}
