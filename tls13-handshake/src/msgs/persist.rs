use core::fmt;
use core::time::Duration;

use pki_types::UnixTime;
use zeroize::Zeroize;

use crate::enums::CipherSuite;
use crate::error::InvalidMessage;
use crate::msgs::base::{PayloadU16, PayloadU8};
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::handshake::NewSessionTicketPayloadTls13;

/// RFC8446: "Servers MUST NOT use any value greater than
/// 604800 seconds (7 days)."
pub(crate) const MAX_TICKET_LIFETIME: u32 = 7 * 24 * 60 * 60;

/// A resumption ticket received from a server, with the PSK it unlocks.
///
/// Values of this type are produced by the handshake engine when a
/// NewSessionTicket message arrives after the handshake completes, and can be
/// supplied to a later handshake via `ClientConfig::resumption`.
///
/// [`Codec::get_encoding`] and [`NewSessionTicket::from_bytes`] give a stable,
/// lossless byte form for storing tickets between processes.
#[derive(Clone)]
pub struct NewSessionTicket {
    suite: CipherSuite,
    psk: PayloadU8,
    ticket: PayloadU16,
    lifetime: u32,
    age_add: u32,
    received_at: UnixTime,
}

impl NewSessionTicket {
    pub(crate) fn new(
        suite: CipherSuite,
        ticket: &NewSessionTicketPayloadTls13,
        psk: Vec<u8>,
        received_at: UnixTime,
    ) -> Self {
        Self {
            suite,
            psk: PayloadU8::new(psk),
            ticket: ticket.ticket.clone(),
            lifetime: ticket.lifetime,
            age_add: ticket.age_add,
            received_at,
        }
    }

    /// Decode a ticket previously encoded with [`Codec::get_encoding`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidMessage> {
        let mut r = Reader::init(bytes);
        let ticket = Self::read(&mut r)?;
        r.expect_empty("NewSessionTicket")?;
        Ok(ticket)
    }

    /// The cipher suite of the session that issued this ticket.
    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// The opaque ticket, sent back as the PSK identity.
    pub fn ticket(&self) -> &[u8] {
        &self.ticket.0
    }

    /// The resumption PSK derived from the issuing session's resumption master secret.
    pub fn psk(&self) -> &[u8] {
        &self.psk.0
    }

    /// Ticket lifetime in seconds, as sent by the server.
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    /// The server's `ticket_age_add`, which masks the age we send back.
    pub fn age_add(&self) -> u32 {
        self.age_add
    }

    /// When the ticket was received.
    pub fn received_at(&self) -> UnixTime {
        self.received_at
    }

    fn age(&self, now: UnixTime) -> Duration {
        Duration::from_secs(
            now.as_secs()
                .saturating_sub(self.received_at.as_secs()),
        )
    }

    /// The `obfuscated_ticket_age` to offer at time `now`.
    ///
    /// This is the ticket age in milliseconds plus `age_add`, modulo 2^32.
    pub fn obfuscated_ticket_age(&self, now: UnixTime) -> u32 {
        let age_millis = self.age(now).as_millis() as u32;
        age_millis.wrapping_add(self.age_add)
    }

    /// Whether the ticket may no longer be offered at time `now`.
    pub fn has_expired(&self, now: UnixTime) -> bool {
        self.lifetime > MAX_TICKET_LIFETIME || self.age(now).as_secs() > u64::from(self.lifetime)
    }
}

impl Codec for NewSessionTicket {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.suite.encode(bytes);
        self.psk.encode(bytes);
        self.ticket.encode(bytes);
        self.lifetime.encode(bytes);
        self.age_add.encode(bytes);
        self.received_at
            .as_secs()
            .encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            suite: CipherSuite::read(r)?,
            psk: PayloadU8::read(r)?,
            ticket: PayloadU16::read(r)?,
            lifetime: u32::read(r)?,
            age_add: u32::read(r)?,
            received_at: UnixTime::since_unix_epoch(Duration::from_secs(u64::read(r)?)),
        })
    }
}

impl fmt::Debug for NewSessionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewSessionTicket")
            .field("suite", &self.suite)
            .field("ticket", &self.ticket)
            .field("lifetime", &self.lifetime)
            .field("received_at", &self.received_at.as_secs())
            .finish_non_exhaustive()
    }
}

impl PartialEq for NewSessionTicket {
    fn eq(&self, other: &Self) -> bool {
        self.get_encoding() == other.get_encoding()
    }
}

impl Drop for NewSessionTicket {
    fn drop(&mut self) {
        self.psk.zeroize();
    }
}
