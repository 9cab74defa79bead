//! Named-challenge Fiat-Shamir transcript.
//!
//! Every challenge of a protocol run is declared up front by name. Prover
//! messages are bound to the challenge they feed, and challenges must be
//! computed in declaration order: challenge `i` hashes its own name, the value
//! of challenge `i - 1` and its bindings.
//!
//! Default hasher is Keccak256 (tiny_keccak).

use crate::gkr_error::GkrError;
use crate::Fr;
use ark_ff::{BigInteger, PrimeField};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tiny_keccak::{Hasher, Keccak};

// ============================================================
//                    HASHERS
// ============================================================

/// Hash used to derive challenge bytes from the concatenation of `parts`.
pub trait TranscriptHasher: Send + Sync + fmt::Debug {
    fn digest(&self, parts: &[&[u8]]) -> Vec<u8>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hasher;

impl TranscriptHasher for Keccak256Hasher {
    fn digest(&self, parts: &[&[u8]]) -> Vec<u8> {
        keccak256_multi(parts).to_vec()
    }
}

/// Compute Keccak256 hash of multiple slices
pub fn keccak256_multi(slices: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for slice in slices {
        hasher.update(slice);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Canonical 32-byte big-endian encoding of a field element.
pub fn fr_to_bytes(x: &Fr) -> [u8; 32] {
    let bytes = x.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    // BN254 Fr is four limbs, so this is exactly 32 bytes
    let start = 32usize.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(32)..]);
    out
}

/// Reduces challenge bytes into the field.
pub fn fr_from_challenge(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

// ============================================================
//                    TRANSCRIPT
// ============================================================

#[derive(Clone, Debug)]
struct Challenge {
    name: String,
    bindings: Vec<Vec<u8>>,
    value: Option<Vec<u8>>,
}

#[derive(Clone, Debug)]
pub struct Transcript {
    challenges: Vec<Challenge>,
    positions: HashMap<String, usize>,
    previous: Option<usize>,
    hasher: Arc<dyn TranscriptHasher>,
}

impl Transcript {
    /// Keccak256 transcript over the given challenge names.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, GkrError> {
        Self::with_hasher(Arc::new(Keccak256Hasher), names)
    }

    pub fn with_hasher<S: AsRef<str>>(hasher: Arc<dyn TranscriptHasher>, names: &[S]) -> Result<Self, GkrError> {
        let mut challenges = Vec::with_capacity(names.len());
        let mut positions = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            let name = name.as_ref().to_string();
            if positions.insert(name.clone(), position).is_some() {
                return Err(GkrError::DuplicateChallenge(name));
            }
            challenges.push(Challenge { name, bindings: Vec::new(), value: None });
        }
        Ok(Self { challenges, positions, previous: None, hasher })
    }

    fn position(&self, name: &str) -> Result<usize, GkrError> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| GkrError::ChallengeNotFound(name.to_string()))
    }

    /// Appends `bytes` to the inputs of challenge `name`.
    pub fn bind(&mut self, name: &str, bytes: &[u8]) -> Result<(), GkrError> {
        let position = self.position(name)?;
        let challenge = &mut self.challenges[position];
        if challenge.value.is_some() {
            return Err(GkrError::ChallengeAlreadyComputed(name.to_string()));
        }
        challenge.bindings.push(bytes.to_vec());
        Ok(())
    }

    /// Computes (or returns the cached) value of challenge `name`.
    pub fn compute_challenge(&mut self, name: &str) -> Result<&[u8], GkrError> {
        let position = self.position(name)?;
        if self.challenges[position].value.is_none() {
            let challenge = &self.challenges[position];
            let mut parts: Vec<&[u8]> = Vec::with_capacity(challenge.bindings.len() + 2);
            parts.push(challenge.name.as_bytes());
            if position > 0 {
                let previous = match self.previous {
                    Some(prev) if prev + 1 == position => self.challenges[prev].value.as_deref(),
                    _ => None,
                };
                match previous {
                    Some(value) => parts.push(value),
                    None => return Err(GkrError::PreviousChallengeNotComputed(name.to_string())),
                }
            }
            parts.extend(challenge.bindings.iter().map(Vec::as_slice));
            let value = self.hasher.digest(&parts);
            self.challenges[position].value = Some(value);
            self.previous = Some(position);
        }
        match self.challenges[position].value.as_deref() {
            Some(value) => Ok(value),
            None => Err(GkrError::ChallengeNotFound(name.to_string())),
        }
    }

    /// Binds each element to `name`, then draws it as a field element.
    pub fn next_element(&mut self, name: &str, bindings: &[Fr]) -> Result<Fr, GkrError> {
        for element in bindings {
            self.bind(name, &fr_to_bytes(element))?;
        }
        Ok(fr_from_challenge(self.compute_challenge(name)?))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

// ============================================================
//                    SETTINGS
// ============================================================

enum TranscriptSource<'a> {
    Fresh(Arc<dyn TranscriptHasher>),
    Resume(&'a mut Transcript),
}

/// How a protocol run obtains its transcript.
///
/// A fresh transcript is declared with the run's own challenge names. A
/// resumed one must already declare them under `prefix`. In both cases the
/// base challenges are bound to the first challenge of the run.
pub struct TranscriptSettings<'a> {
    prefix: String,
    base_challenges: Vec<Vec<u8>>,
    source: TranscriptSource<'a>,
}

impl<'a> TranscriptSettings<'a> {
    /// Fresh Keccak256 transcript seeded with `base_challenges`.
    pub fn new(base_challenges: Vec<Vec<u8>>) -> Self {
        Self {
            prefix: String::new(),
            base_challenges,
            source: TranscriptSource::Fresh(Arc::new(Keccak256Hasher)),
        }
    }

    /// Continue on an existing transcript.
    pub fn resume(transcript: &'a mut Transcript, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            base_challenges: Vec::new(),
            source: TranscriptSource::Resume(transcript),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_base_challenges(mut self, base_challenges: Vec<Vec<u8>>) -> Self {
        self.base_challenges = base_challenges;
        self
    }

    /// Hasher for a fresh transcript; a resumed transcript keeps its own.
    pub fn with_hasher(mut self, hasher: Arc<dyn TranscriptHasher>) -> Self {
        if let TranscriptSource::Fresh(_) = self.source {
            self.source = TranscriptSource::Fresh(hasher);
        }
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds or resumes the transcript for a run whose challenges are `names`
    /// and binds the base challenges to `names[0]`.
    pub(crate) fn open(self, names: &[String]) -> Result<(TranscriptHandle<'a>, String), GkrError> {
        let mut handle = match self.source {
            TranscriptSource::Fresh(hasher) => TranscriptHandle::Owned(Transcript::with_hasher(hasher, names)?),
            TranscriptSource::Resume(transcript) => TranscriptHandle::Borrowed(transcript),
        };
        // a run that draws no challenges has nothing to seed
        if let Some(first) = names.first() {
            for base in &self.base_challenges {
                handle.bind(first, base)?;
            }
        }
        Ok((handle, self.prefix))
    }
}

impl fmt::Debug for TranscriptSettings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            TranscriptSource::Fresh(_) => "fresh",
            TranscriptSource::Resume(_) => "resume",
        };
        f.debug_struct("TranscriptSettings")
            .field("prefix", &self.prefix)
            .field("base_challenges", &self.base_challenges.len())
            .field("source", &source)
            .finish()
    }
}

/// Transcript owned by the run or borrowed from the caller.
pub(crate) enum TranscriptHandle<'a> {
    Owned(Transcript),
    Borrowed(&'a mut Transcript),
}

impl Deref for TranscriptHandle<'_> {
    type Target = Transcript;

    fn deref(&self) -> &Transcript {
        match self {
            TranscriptHandle::Owned(t) => t,
            TranscriptHandle::Borrowed(t) => t,
        }
    }
}

impl DerefMut for TranscriptHandle<'_> {
    fn deref_mut(&mut self) -> &mut Transcript {
        match self {
            TranscriptHandle::Owned(t) => t,
            TranscriptHandle::Borrowed(t) => t,
        }
    }
}
