use std::io;

use crate::msgs::handshake::ServerExtension;
use crate::msgs::persist::NewSessionTicket;

/// Where the engine puts the handshake messages it produces.
///
/// Each call carries one complete, encoded handshake message (type, length
/// and body).  Framing it into records and protecting it is the
/// implementer's business.
pub trait MessageSender: Send {
    /// Send one encoded handshake message.
    ///
    /// An error is fatal to the handshake; it is returned to the caller
    /// as [`crate::Error::Io`].
    fn send(&mut self, message: &[u8]) -> io::Result<()>;
}

impl MessageSender for Vec<Vec<u8>> {
    fn send(&mut self, message: &[u8]) -> io::Result<()> {
        self.push(message.to_vec());
        Ok(())
    }
}

/// Notifications about handshake progress.
///
/// Calls happen synchronously, from inside [`crate::ClientHandshake`]
/// methods, after the state they describe has been reached.  Nothing
/// returned here affects the handshake.  Every method has an empty default.
pub trait StatusEvents: Send {
    /// The ClientHello was sent and the early secrets were derived.
    fn early_secrets_available(&mut self) {}

    /// The ServerHello was accepted and the handshake traffic secrets derived.
    fn handshake_secrets_available(&mut self) {}

    /// The server's EncryptedExtensions were accepted.
    fn extensions_received(&mut self, _extensions: &[ServerExtension]) {}

    /// Both Finished messages were exchanged and the application traffic
    /// secrets derived.
    fn handshake_finished(&mut self) {}

    /// The server issued a resumption ticket.
    fn new_session_ticket(&mut self, _ticket: NewSessionTicket) {}
}

/// A [`StatusEvents`] that ignores every notification.
#[derive(Debug, Default)]
pub struct NoStatusEvents;

impl StatusEvents for NoStatusEvents {}
