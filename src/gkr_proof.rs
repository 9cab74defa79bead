//! GKR proof container and its encodings.
//!
//! Byte layout, all lengths `u32` big-endian:
//! `wires || for each wire: rounds || (len || elements)* || final_len || elements`
//! with each field element as 32 canonical big-endian bytes.

use crate::fiat_shamir::fr_to_bytes;
use crate::gkr_error::GkrError;
use crate::sumcheck::SumcheckProof;
use crate::Fr;
use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

const ELEMENT_BYTES: usize = 32;

/// One sumcheck proof per wire, indexed by position in the sorted order.
/// Wires that need no proof hold an empty entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof(Vec<SumcheckProof>);

impl Proof {
    pub fn new(wires: Vec<SumcheckProof>) -> Self {
        Self(wires)
    }

    pub fn into_inner(self) -> Vec<SumcheckProof> {
        self.0
    }

    pub fn wires_mut(&mut self) -> &mut [SumcheckProof] {
        &mut self.0
    }

    /// Total field elements; equals `gkr::proof_size` for a well-formed proof.
    pub fn element_count(&self) -> usize {
        self.0.iter().map(SumcheckProof::element_count).sum()
    }

    /// All round polynomials and final payloads, in wire order.
    pub fn to_field_elements(&self) -> Vec<Fr> {
        let mut out = Vec::with_capacity(self.element_count());
        for wire in &self.0 {
            for poly in &wire.partial_sum_polys {
                out.extend_from_slice(poly);
            }
            out.extend_from_slice(&wire.final_eval_proof);
        }
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.element_count() * ELEMENT_BYTES + self.0.len() * 8);
        bytes.extend_from_slice(&(self.0.len() as u32).to_be_bytes());
        for wire in &self.0 {
            bytes.extend_from_slice(&(wire.partial_sum_polys.len() as u32).to_be_bytes());
            for poly in &wire.partial_sum_polys {
                write_elements(&mut bytes, poly);
            }
            write_elements(&mut bytes, &wire.final_eval_proof);
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GkrError> {
        let mut reader = Reader { bytes, offset: 0 };
        let wires = reader.read_len("wire count")?;
        let mut out = Vec::with_capacity(wires.min(bytes.len() / 4));
        for _ in 0..wires {
            let rounds = reader.read_len("round count")?;
            let mut partial_sum_polys = Vec::with_capacity(rounds.min(bytes.len() / 4));
            for _ in 0..rounds {
                partial_sum_polys.push(reader.read_elements()?);
            }
            let final_eval_proof = reader.read_elements()?;
            out.push(SumcheckProof { partial_sum_polys, final_eval_proof });
        }
        if reader.offset != bytes.len() {
            return Err(GkrError::Encoding(format!("{} trailing bytes", bytes.len() - reader.offset)));
        }
        Ok(Self(out))
    }

    pub fn to_json(&self) -> Result<String, GkrError> {
        serde_json::to_string(self).map_err(|e| GkrError::Encoding(format!("json encode failed: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self, GkrError> {
        serde_json::from_str(json).map_err(|e| GkrError::Encoding(format!("json decode failed: {e}")))
    }
}

impl Deref for Proof {
    type Target = [SumcheckProof];

    fn deref(&self) -> &[SumcheckProof] {
        &self.0
    }
}

impl From<Vec<SumcheckProof>> for Proof {
    fn from(wires: Vec<SumcheckProof>) -> Self {
        Self(wires)
    }
}

fn write_elements(bytes: &mut Vec<u8>, elements: &[Fr]) {
    bytes.extend_from_slice(&(elements.len() as u32).to_be_bytes());
    for x in elements {
        bytes.extend_from_slice(&fr_to_bytes(x));
    }
}

/// Decodes 32 big-endian bytes, rejecting values at or above the modulus.
pub fn fr_from_canonical_bytes(bytes: &[u8]) -> Result<Fr, GkrError> {
    if bytes.len() != ELEMENT_BYTES {
        return Err(GkrError::Encoding(format!("field element has {} bytes", bytes.len())));
    }
    let x = Fr::from_be_bytes_mod_order(bytes);
    if fr_to_bytes(&x)[..] != bytes[..] {
        return Err(GkrError::Encoding("non-canonical field element".to_string()));
    }
    Ok(x)
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take(&mut self, n: usize, what: &str) -> Result<&[u8], GkrError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| GkrError::Encoding(format!("truncated {what} at offset {}", self.offset)))?;
        let out = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(out)
    }

    fn read_len(&mut self, what: &str) -> Result<usize, GkrError> {
        let raw = self.take(4, what)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(raw);
        Ok(u32::from_be_bytes(buf) as usize)
    }

    fn read_elements(&mut self) -> Result<Vec<Fr>, GkrError> {
        let len = self.read_len("element count")?;
        let total = len
            .checked_mul(ELEMENT_BYTES)
            .ok_or_else(|| GkrError::Encoding(format!("element count {len} overflows")))?;
        let raw = self.take(total, "field elements")?;
        raw.chunks_exact(ELEMENT_BYTES).map(fr_from_canonical_bytes).collect()
    }
}

fn fr_to_hex(x: &Fr) -> String {
    format!("0x{}", hex::encode(fr_to_bytes(x)))
}

fn fr_from_hex(s: &str) -> Result<Fr, String> {
    let raw = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| e.to_string())?;
    fr_from_canonical_bytes(&raw).map_err(|e| e.to_string())
}

/// Serde adapter: `Vec<Fr>` as `0x`-prefixed hex strings.
pub(crate) mod fr_vec {
    use super::{fr_from_hex, fr_to_hex};
    use crate::Fr;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[Fr], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(fr_to_hex))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Fr>, D::Error> {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter().map(|s| fr_from_hex(s).map_err(D::Error::custom)).collect()
    }
}

/// Serde adapter: `Vec<Vec<Fr>>` as nested hex string arrays.
pub(crate) mod fr_vec_vec {
    use super::{fr_from_hex, fr_to_hex};
    use crate::Fr;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[Vec<Fr>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|poly| poly.iter().map(fr_to_hex).collect::<Vec<_>>()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<Fr>>, D::Error> {
        let raw: Vec<Vec<String>> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|poly| poly.iter().map(|s| fr_from_hex(s).map_err(D::Error::custom)).collect())
            .collect()
    }
}
