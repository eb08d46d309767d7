use core::fmt::Debug;

use pki_types::UnixTime;

/// Wall-clock time for the engine.
///
/// Consulted when validating the server's certificate, when a ticket is
/// received, and when a ticket's age is computed for a resumption offer.
/// Tests substitute a fixed clock.
pub trait TimeProvider: Debug + Send + Sync {
    /// Need not be monotonic.  `None` fails the operation that asked with
    /// [`Error::FailedToGetCurrentTime`](crate::Error::FailedToGetCurrentTime).
    fn current_time(&self) -> Option<UnixTime>;
}

/// The system clock.
#[derive(Debug)]
pub struct DefaultTimeProvider;

impl TimeProvider for DefaultTimeProvider {
    fn current_time(&self) -> Option<UnixTime> {
        Some(UnixTime::now())
    }
}
