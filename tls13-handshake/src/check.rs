#[cfg(feature = "logging")]
use crate::log::warn;
use crate::enums::HandshakeType;
use crate::error::Error;
use crate::msgs::handshake::HandshakeMessagePayload;

/// Borrow the `$variant` body of handshake message `$m`, or fail with
/// `InappropriateHandshakeMessage` saying `$typ` was wanted.
macro_rules! require_handshake_msg(
  ( $m:expr, $typ:path, $variant:path ) => (
    match &$m.payload().payload {
        $variant(body) => Ok(body),
        _ => Err($crate::check::inappropriate_handshake_message($m.payload(), &[$typ])),
    }
  )
);

pub(crate) fn inappropriate_handshake_message(
    got: &HandshakeMessagePayload,
    wanted: &[HandshakeType],
) -> Error {
    warn!("{:?} arrived while waiting for one of {:?}", got.typ, wanted);
    Error::InappropriateHandshakeMessage {
        expect_types: wanted.to_vec(),
        got_type: got.typ,
    }
}
