use mdag_types::Digest;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;

/// Incremental hash state: absorb bytes, then produce a digest.
pub trait DigestState {
    /// Absorb more input.
    fn update(&mut self, data: &[u8]);

    /// Consume the state and produce the digest.
    fn finalize(self: Box<Self>) -> Digest;
}

/// A pluggable hash primitive.
///
/// Implementations are stateless factories; every call to [`begin`] returns a
/// fresh state, which is what "reset" means here. This lets one primitive be
/// shared across a whole build without interior mutability.
///
/// [`begin`]: HashPrimitive::begin
pub trait HashPrimitive: Send + Sync {
    /// Short algorithm name, for logs.
    fn name(&self) -> &'static str;

    /// Start a new hash computation.
    fn begin(&self) -> Box<dyn DigestState>;

    /// Hash `data` in one shot.
    fn digest(&self, data: &[u8]) -> Digest {
        let mut state = self.begin();
        state.update(data);
        state.finalize()
    }
}

/// Built-in hash algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3, 32-byte output.
    #[default]
    Blake3,
    /// SHA-256, 32-byte output.
    Sha256,
}

impl HashAlgorithm {
    /// Output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Blake3 => blake3::OUT_LEN,
            Self::Sha256 => 32,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl HashPrimitive for HashAlgorithm {
    fn name(&self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }

    fn begin(&self) -> Box<dyn DigestState> {
        match self {
            Self::Blake3 => Box::new(Blake3State(blake3::Hasher::new())),
            Self::Sha256 => Box::new(Sha256State(sha2::Sha256::new())),
        }
    }
}

struct Blake3State(blake3::Hasher);

impl DigestState for Blake3State {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from(*self.0.finalize().as_bytes())
    }
}

struct Sha256State(sha2::Sha256);

impl DigestState for Sha256State {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from(self.0.finalize().to_vec())
    }
}
