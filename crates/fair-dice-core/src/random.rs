//! Injectable secure random source.

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Generators accepted as a secure source
pub trait SecureRng: RngCore + CryptoRng + Send {}

impl<T: RngCore + CryptoRng + Send> SecureRng for T {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Os,
    Seeded,
}

/// Shared handle to a cryptographically secure generator.
///
/// Clones share one generator and serialize access to it through a mutex.
/// Workers that draw in parallel should call [`SecureRandom::fork`] and own
/// the returned instance instead of contending on the shared one.
///
/// Production code uses [`SecureRandom::os`]. [`SecureRandom::from_seed`]
/// exists so tests can replay a game; it has the same interface but its
/// output is only as secret as the seed.
#[derive(Clone)]
pub struct SecureRandom {
    source: Source,
    inner: Arc<Mutex<Box<dyn SecureRng>>>,
}

impl SecureRandom {
    /// Operating-system backed source
    pub fn os() -> Self {
        Self::with_source(Source::Os, Box::new(OsRng))
    }

    /// ChaCha20 stream from a fixed seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::with_source(Source::Seeded, Box::new(ChaCha20Rng::from_seed(seed)))
    }

    fn with_source(source: Source, rng: Box<dyn SecureRng>) -> Self {
        Self {
            source,
            inner: Arc::new(Mutex::new(rng)),
        }
    }

    /// Whether the output is reproducible from a seed
    pub fn is_deterministic(&self) -> bool {
        self.source == Source::Seeded
    }

    /// Create an independent instance that shares no state with this one.
    ///
    /// An OS-backed source forks into a fresh OS handle. A seeded source
    /// draws a new seed from its own stream, so forks are reproducible but
    /// uncorrelated with the parent and with each other.
    pub fn fork(&self) -> Self {
        match self.source {
            Source::Os => Self::os(),
            Source::Seeded => {
                let mut seed = [0u8; 32];
                self.fill_bytes(&mut seed);
                Self::from_seed(seed)
            }
        }
    }

    /// Fill `dest` with random bytes
    pub fn fill_bytes(&self, dest: &mut [u8]) {
        self.with_rng(|rng| rng.fill_bytes(dest));
    }

    /// Uniform integer in `[0, upper)`.
    ///
    /// # Panics
    ///
    /// Panics if `upper` is zero. Callers validate ranges first.
    pub fn below(&self, upper: u64) -> u64 {
        self.with_rng(|rng| rng.gen_range(0..upper))
    }

    /// Uniform index in `[0, len)`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn index(&self, len: usize) -> usize {
        self.with_rng(|rng| rng.gen_range(0..len))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut dyn SecureRng) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **guard)
    }
}

impl Default for SecureRandom {
    fn default() -> Self {
        Self::os()
    }
}

impl fmt::Debug for SecureRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Source::Os => write!(f, "SecureRandom(os)"),
            Source::Seeded => write!(f, "SecureRandom(seeded)"),
        }
    }
}
