use core::fmt::Debug;

/// Receives every secret the key schedule derives, labelled the way
/// NSS key log files label them, so that a capture of the session can be
/// decrypted later.
///
/// Anything implementing this sees enough to break the session; only
/// install one for debugging.  `log` takes `&self`, so an implementation
/// that records needs interior mutability.
pub trait KeyLog: Debug + Send + Sync {
    /// Record `secret` under `label`, for the session whose ClientHello
    /// carried `client_random`.
    ///
    /// The labels passed are `CLIENT_EARLY_TRAFFIC_SECRET`,
    /// `EARLY_EXPORTER_SECRET`, `CLIENT_HANDSHAKE_TRAFFIC_SECRET`,
    /// `SERVER_HANDSHAKE_TRAFFIC_SECRET`, `CLIENT_TRAFFIC_SECRET_0`,
    /// `SERVER_TRAFFIC_SECRET_0` and `EXPORTER_SECRET`.
    fn log(&self, label: &str, client_random: &[u8], secret: &[u8]);

    /// Return false to skip `log` calls for `label`.
    fn will_log(&self, _label: &str) -> bool {
        true
    }
}

/// The default: secrets go nowhere.
#[derive(Debug)]
pub struct NoKeyLog;

impl KeyLog for NoKeyLog {
    fn log(&self, _: &str, _: &[u8], _: &[u8]) {}

    fn will_log(&self, _label: &str) -> bool {
        false
    }
}
