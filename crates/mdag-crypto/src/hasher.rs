use std::sync::Arc;

use mdag_types::{codec, CodecResult, Digest, Object};

use crate::primitive::{HashAlgorithm, HashPrimitive};

/// Computes canonical object digests.
///
/// - A leaf object hashes to `H(encoded bytes)`.
/// - A link-bearing object hashes to `H(link[0].hash ‖ … ‖ link[n-1].hash)`.
///   Its own `data` (the tag bytes) does not participate, so two objects with
///   the same ordered child digests share a digest.
#[derive(Clone)]
pub struct ObjectHasher {
    primitive: Arc<dyn HashPrimitive>,
}

impl ObjectHasher {
    /// Hasher over an injected primitive.
    pub fn new(primitive: Arc<dyn HashPrimitive>) -> Self {
        Self { primitive }
    }

    /// Hasher over one of the built-in algorithms.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self::new(Arc::new(algorithm))
    }

    /// Name of the underlying primitive.
    pub fn algorithm_name(&self) -> &'static str {
        self.primitive.name()
    }

    /// Digest of `object`, given its already-encoded form.
    pub fn hash(&self, object: &Object, encoded: &[u8]) -> Digest {
        if object.is_leaf() {
            return self.primitive.digest(encoded);
        }
        let mut state = self.primitive.begin();
        for link in &object.links {
            state.update(link.hash.as_bytes());
        }
        state.finalize()
    }

    /// Encode `object` and compute its digest in one step.
    pub fn encode_and_hash(&self, object: &Object) -> CodecResult<(Vec<u8>, Digest)> {
        let encoded = codec::encode(object)?;
        let digest = self.hash(object, &encoded);
        Ok((encoded, digest))
    }

    /// Returns `true` if `object` hashes to `expected`.
    pub fn verify(&self, object: &Object, encoded: &[u8], expected: &Digest) -> bool {
        self.hash(object, encoded) == *expected
    }
}

impl Default for ObjectHasher {
    fn default() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }
}

impl std::fmt::Debug for ObjectHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectHasher")
            .field("algorithm", &self.primitive.name())
            .finish()
    }
}
