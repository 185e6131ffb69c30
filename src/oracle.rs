// Padding oracles.
//
// An oracle answers one question about a candidate ciphertext: does it
// decrypt to something with valid PKCS#7 padding? The attack never learns
// anything else. Any `FnMut(&[u8]) -> bool` is an oracle; predicates that can
// fail (a dropped connection, say) are wrapped in `Fallible` so the failure
// reaches the caller instead of being read as "invalid padding".
use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error raised by the oracle itself, as opposed to a `false` answer.
#[derive(Debug)]
pub struct OracleFault(BoxError);

impl OracleFault {
    pub fn new<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self(source.into())
    }
}

impl fmt::Display for OracleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for OracleFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

pub trait Oracle {
    fn query(&mut self, ciphertext: &[u8]) -> Result<bool, OracleFault>;
}

impl<F> Oracle for F
where
    F: FnMut(&[u8]) -> bool,
{
    fn query(&mut self, ciphertext: &[u8]) -> Result<bool, OracleFault> {
        Ok(self(ciphertext))
    }
}

/// An oracle that can be queried from several threads at once.
pub trait SharedOracle: Sync {
    fn query_shared(&self, ciphertext: &[u8]) -> Result<bool, OracleFault>;
}

impl<F> SharedOracle for F
where
    F: Fn(&[u8]) -> bool + Sync,
{
    fn query_shared(&self, ciphertext: &[u8]) -> Result<bool, OracleFault> {
        Ok(self(ciphertext))
    }
}

/// Adapts a predicate returning `Result<bool, E>` into an oracle.
pub struct Fallible<F>(pub F);

impl<F, E> Oracle for Fallible<F>
where
    F: FnMut(&[u8]) -> Result<bool, E>,
    E: Into<BoxError>,
{
    fn query(&mut self, ciphertext: &[u8]) -> Result<bool, OracleFault> {
        (self.0)(ciphertext).map_err(OracleFault::new)
    }
}

impl<F, E> SharedOracle for Fallible<F>
where
    F: Fn(&[u8]) -> Result<bool, E> + Sync,
    E: Into<BoxError>,
{
    fn query_shared(&self, ciphertext: &[u8]) -> Result<bool, OracleFault> {
        (self.0)(ciphertext).map_err(OracleFault::new)
    }
}
