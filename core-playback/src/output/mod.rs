//! Audio output backends.
//!
//! - [`ClockBackend`]: silent, clock-driven; always available.
//! - [`RodioBackend`]: audible output on the default device (`rodio-output`
//!   feature).

mod clock;
#[cfg(feature = "rodio-output")]
mod rodio_output;

pub use clock::{ClockBackend, ClockHandle};
#[cfg(feature = "rodio-output")]
pub use rodio_output::{RodioBackend, RodioHandle};

use crate::traits::AudioBackend;
use std::sync::Arc;

/// The backend to use when nothing else was requested.
///
/// Audible when the `rodio-output` feature is compiled in and `silent` is
/// false, otherwise the clock backend.
pub fn default_backend(silent: bool) -> Arc<dyn AudioBackend> {
    #[cfg(feature = "rodio-output")]
    if !silent {
        return Arc::new(RodioBackend::new());
    }

    #[cfg(not(feature = "rodio-output"))]
    let _ = silent;

    Arc::new(ClockBackend::new())
}
