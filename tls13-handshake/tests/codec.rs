//! Wire-format tests: what the engine puts on the wire, and what it
//! accepts from it.

use tls13_handshake::internal::msgs::base::Payload;
use tls13_handshake::internal::msgs::codec::Codec;
use tls13_handshake::internal::msgs::enums::ExtensionType;
use tls13_handshake::internal::msgs::handshake::{HandshakePayload, UnknownExtension};
use tls13_handshake::{
    CipherSuite, Error, HandshakeMessage, HandshakeType, InvalidMessage, NewSessionTicket,
    ServerExtension, Status,
};

mod common;
use crate::common::*;

fn u24(bytes: &[u8]) -> usize {
    (usize::from(bytes[0]) << 16) | (usize::from(bytes[1]) << 8) | usize::from(bytes[2])
}

fn issued_ticket(pki: &Pki) -> NewSessionTicket {
    let (mut hs, sent, _) = make_handshake(make_config(pki));
    let mut server = TestServer::new(CipherSuite::TLS13_AES_128_GCM_SHA256, pki);
    do_full_handshake(&mut hs, &sent, &mut server);
    let (nst, _) = server.new_session_ticket(&[9, 9], b"opaque ticket");
    hs.received(nst).unwrap();
    hs.tickets()[0].clone()
}

#[test]
fn client_hello_framing() {
    let pki = Pki::new();
    let (mut hs, sent, _) = make_handshake(make_config(&pki));
    hs.start_handshake(SCHEMES).unwrap();
    let bytes = sent.take().remove(0);

    assert_eq!(bytes[0], u8::from(HandshakeType::ClientHello));
    assert_eq!(u24(&bytes[1..4]), bytes.len() - 4);
    // legacy_version
    assert_eq!(&bytes[4..6], &[0x03, 0x03]);
    // random, then an empty legacy_session_id
    assert_eq!(&bytes[6..38], &[0x11; 32]);
    assert_eq!(bytes[38], 0);
    // one cipher suite
    assert_eq!(&bytes[39..43], &[0x00, 0x02, 0x13, 0x01]);
    // only the null compression method
    assert_eq!(&bytes[43..45], &[0x01, 0x00]);

    let m = HandshakeMessage::read_bytes(&bytes).unwrap();
    assert_eq!(m.typ(), HandshakeType::ClientHello);
    assert_eq!(m.payload().get_encoding(), bytes);
}

#[test]
fn client_hello_binders_are_the_final_bytes() {
    let pki = Pki::new();
    let ticket = issued_ticket(&pki);

    let mut config = make_config(&pki);
    config.resumption = Some(ticket);
    let (mut hs, sent, _) = make_handshake(config);
    hs.start_handshake(SCHEMES).unwrap();
    let bytes = sent.take().remove(0);

    let m = HandshakeMessage::read_bytes(&bytes).unwrap();
    let truncated = m.payload().get_encoding_for_binder_signing();

    // binders list: u16 length, then one u8-prefixed SHA-256 binder
    assert_eq!(truncated.len(), bytes.len() - 35);
    assert_eq!(&bytes[..truncated.len()], &truncated[..]);
    assert_eq!(&bytes[truncated.len()..truncated.len() + 3], &[0x00, 0x21, 0x20]);
}

#[test]
fn stored_ticket_decodes_to_the_same_ticket() {
    let pki = Pki::new();
    let ticket = issued_ticket(&pki);

    let encoded = ticket.get_encoding();
    let decoded = NewSessionTicket::from_bytes(&encoded).unwrap();
    assert_eq!(decoded, ticket);
    assert_eq!(decoded.ticket(), b"opaque ticket");
    assert_eq!(decoded.received_at(), ticket.received_at());
}

#[test]
fn stored_ticket_with_bad_length_is_rejected() {
    let pki = Pki::new();
    let encoded = issued_ticket(&pki).get_encoding();

    assert!(NewSessionTicket::from_bytes(&encoded[..encoded.len() - 1]).is_err());

    let mut long = encoded.clone();
    long.push(0);
    assert_eq!(
        NewSessionTicket::from_bytes(&long),
        Err(InvalidMessage::TrailingData("NewSessionTicket"))
    );
}

#[test]
fn server_hello_with_overlong_length_is_rejected() {
    let pki = Pki::new();
    let (mut hs, sent, _) = make_handshake(make_config(&pki));
    let server = TestServer::new(CipherSuite::TLS13_AES_128_GCM_SHA256, &pki);
    hs.start_handshake(SCHEMES).unwrap();
    sent.take();

    let mut bytes = server
        .unrecorded_server_hello(TestServer::default_server_hello_extensions())
        .bytes()
        .to_vec();
    bytes[3] += 1;

    let err = hs.received_bytes(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidMessage(_)));
    assert_eq!(hs.status(), Status::Aborted);
}

#[test]
fn server_hello_with_truncated_extensions_is_rejected() {
    let pki = Pki::new();
    let (mut hs, sent, _) = make_handshake(make_config(&pki));
    let server = TestServer::new(CipherSuite::TLS13_AES_128_GCM_SHA256, &pki);
    hs.start_handshake(SCHEMES).unwrap();
    sent.take();

    let mut bytes = server
        .unrecorded_server_hello(TestServer::default_server_hello_extensions())
        .bytes()
        .to_vec();
    // drop the last byte of the key share, and fix up the outer length
    bytes.pop();
    let len = bytes.len() - 4;
    bytes[1..4].copy_from_slice(&(len as u32).to_be_bytes()[1..]);

    assert!(matches!(
        hs.received_bytes(&bytes),
        Err(Error::InvalidMessage(_))
    ));
}

#[test]
fn unknown_encrypted_extensions_are_passed_through() {
    let pki = Pki::new();
    let (mut hs, sent, events) = make_handshake(make_config(&pki));
    let mut server = TestServer::new(CipherSuite::TLS13_AES_128_GCM_SHA256, &pki);
    hs.start_handshake(SCHEMES).unwrap();
    server.read_client_hello(&sent.take()[0]);
    hs.received(server.server_hello(TestServer::default_server_hello_extensions()))
        .unwrap();

    let unknown = ServerExtension::Unknown(UnknownExtension {
        typ: ExtensionType::Unknown(0xfe0d),
        payload: Payload::new(vec![1, 2, 3]),
    });
    let ee = server.encrypted_extensions(vec![unknown.clone()]);

    // it survives the trip through bytes
    let decoded = HandshakeMessage::read_bytes(ee.bytes()).unwrap();
    match &decoded.payload().payload {
        HandshakePayload::EncryptedExtensions(exts) => assert_eq!(exts, &[unknown.clone()]),
        other => panic!("unexpected payload {:?}", other),
    }

    hs.received_bytes(ee.bytes()).unwrap();
    assert_eq!(hs.received_extensions(), &[unknown]);
    assert_eq!(hs.status(), Status::EncryptedExtensionsReceived);
    assert!(events
        .take()
        .iter()
        .any(|e| matches!(e, Event::Extensions(exts) if exts.len() == 1)));
}
