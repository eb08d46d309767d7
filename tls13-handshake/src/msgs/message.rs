use crate::enums::HandshakeType;
use crate::error::InvalidMessage;
use crate::msgs::base::Payload;
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::handshake::HandshakeMessagePayload;

/// One complete handshake message.
///
/// `parsed` is the decoded message; `encoded` is the exact byte sequence it was
/// decoded from (or encoded to), which is what enters the transcript hash.
/// Neither can be changed without the other.
#[derive(Clone, Debug)]
pub struct HandshakeMessage {
    pub(crate) parsed: HandshakeMessagePayload,
    pub(crate) encoded: Payload,
}

impl HandshakeMessage {
    /// Decode exactly one handshake message from `bytes`.
    ///
    /// The declared length must match the data exactly: bytes beyond the
    /// declared body are an error, never silently ignored.
    pub fn read_bytes(bytes: &[u8]) -> Result<Self, InvalidMessage> {
        let mut r = Reader::init(bytes);
        let parsed = HandshakeMessagePayload::read(&mut r)?;
        r.expect_empty("HandshakeMessage")?;

        Ok(Self {
            parsed,
            encoded: Payload::new(bytes),
        })
    }

    pub fn typ(&self) -> HandshakeType {
        self.parsed.typ
    }

    /// The decoded message.
    pub fn payload(&self) -> &HandshakeMessagePayload {
        &self.parsed
    }

    pub fn bytes(&self) -> &[u8] {
        self.encoded.bytes()
    }
}

impl From<HandshakeMessagePayload> for HandshakeMessage {
    fn from(parsed: HandshakeMessagePayload) -> Self {
        let encoded = Payload::new(parsed.get_encoding());
        Self { parsed, encoded }
    }
}
