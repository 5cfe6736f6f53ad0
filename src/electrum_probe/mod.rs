pub mod probe;
pub mod result;
pub mod transport;

pub mod prelude {
    pub use super::probe::{DEFAULT_TIMEOUT, ProbeError, Prober};
    pub use super::result::ProbeOutcome;
}
