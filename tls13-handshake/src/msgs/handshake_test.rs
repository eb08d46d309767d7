use pki_types::{CertificateDer, DnsName};

use super::base::{Payload, PayloadU16, PayloadU8};
use super::codec::{put_u16, Codec, Reader};
use super::enums::{Compression, ExtensionType, NamedGroup, PskKeyExchangeMode};
use super::handshake::{
    CertificateEntry, CertificatePayloadTls13, ClientExtension,
    ClientHelloPayload, DigitallySignedStruct, HandshakeMessagePayload, HandshakePayload,
    KeyShareEntry, NewSessionTicketExtension, NewSessionTicketPayloadTls13, PresharedKeyBinder,
    PresharedKeyIdentity, PresharedKeyOffer, ProtocolName, Random, ServerExtension,
    ServerHelloPayload, ServerNameEntry, SessionId, UnknownExtension,
    HELLO_RETRY_REQUEST_RANDOM,
};
use crate::enums::{CipherSuite, HandshakeType, ProtocolVersion, SignatureScheme};
use crate::error::InvalidMessage;

#[test]
fn rejects_short_random() {
    let bytes = [0x01; 31];
    let mut rd = Reader::init(&bytes);
    assert!(Random::read(&mut rd).is_err());
}

#[test]
fn reads_random() {
    let bytes = [0x01; 32];
    let mut rd = Reader::init(&bytes);
    let rnd = Random::read(&mut rd).unwrap();
    println!("{rnd:?}");

    assert!(!rd.any_left());
}

#[test]
fn debug_random() {
    assert_eq!(
        "0101010101010101010101010101010101010101010101010101010101010101",
        format!("{:?}", Random::from([1; 32]))
    );
}

#[test]
fn rejects_truncated_session_id() {
    let bytes = [32; 32];
    let mut rd = Reader::init(&bytes);
    assert!(SessionId::read(&mut rd).is_err());
}

#[test]
fn rejects_session_id_with_bad_length() {
    let bytes = [33; 33];
    let mut rd = Reader::init(&bytes);
    assert!(SessionId::read(&mut rd).is_err());
}

#[test]
fn session_id_with_different_lengths_are_unequal() {
    let a = SessionId::read(&mut Reader::init(&[1u8, 1])).unwrap();
    let b = SessionId::read(&mut Reader::init(&[2u8, 1, 2])).unwrap();
    assert_ne!(a, b);
}

#[test]
fn accepts_empty_session_id() {
    let bytes = [0; 1];
    let mut rd = Reader::init(&bytes);
    let sess = SessionId::read(&mut rd).unwrap();

    assert!(sess.is_empty());
    assert_eq!(sess, SessionId::empty());
    assert!(!rd.any_left());
}

#[test]
fn debug_session_id() {
    let sess = SessionId::new([1; 32]);
    assert_eq!(32, sess.len());
    assert_eq!(
        "0101010101010101010101010101010101010101010101010101010101010101",
        format!("{sess:?}")
    );
}

#[test]
fn refuses_client_ext_with_unparsed_bytes() {
    let bytes = [0x00u8, 0x2b, 0x00, 0x04, 0x02, 0x03, 0x04, 0xff];
    assert_eq!(
        ClientExtension::read_bytes(&bytes).unwrap_err(),
        InvalidMessage::TrailingData("ClientExtension")
    );
}

#[test]
fn refuses_server_ext_with_unparsed_bytes() {
    let bytes = [0x00u8, 0x29, 0x00, 0x03, 0x00, 0x01, 0xff];
    assert_eq!(
        ServerExtension::read_bytes(&bytes).unwrap_err(),
        InvalidMessage::TrailingData("ServerExtension")
    );
}

#[test]
fn new_session_ticket_ext_keeps_its_body() {
    let bytes = [0x00u8, 0x2a, 0x00, 0x04, 0x00, 0x00, 0x04, 0x00];
    let ext = NewSessionTicketExtension::read_bytes(&bytes).unwrap();
    assert_eq!(ext.ext_type(), ExtensionType::EarlyData);
    assert_eq!(ext.get_encoding(), bytes);
}

#[test]
fn unknown_extension_is_passed_through() {
    let bytes = [0x12u8, 0x34, 0x00, 0x02, 0xab, 0xcd];
    let ext = ClientExtension::read_bytes(&bytes).unwrap();
    assert_eq!(
        ext,
        ClientExtension::Unknown(UnknownExtension {
            typ: ExtensionType::Unknown(0x1234),
            payload: Payload::new(vec![0xab, 0xcd]),
        })
    );
    assert_eq!(ext.get_encoding(), bytes);

    let ext = ServerExtension::read_bytes(&bytes).unwrap();
    assert_eq!(ext.ext_type(), ExtensionType::Unknown(0x1234));
}

#[test]
fn known_extension_with_overlong_inner_length_is_rejected() {
    // supported_versions claiming a 4-byte list inside a 3-byte body
    let bytes = [0x00u8, 0x2b, 0x00, 0x03, 0x04, 0x03, 0x04];
    assert!(ClientExtension::read_bytes(&bytes).is_err());
}

#[test]
fn rejects_truncated_sni() {
    let bytes = [0x00u8, 0x00, 0x00, 0x05, 0x00, 0x03, 0x00, 0x00, 0x05];
    assert!(ClientExtension::read_bytes(&bytes).is_err());
}

#[test]
fn rejects_sni_that_is_not_a_dns_name() {
    let bytes = [0x00u8, 0x00, 0x01, 0xff];
    assert_eq!(
        ServerNameEntry::read_bytes(&bytes).unwrap_err(),
        InvalidMessage::InvalidServerName
    );
}

#[test]
fn sni_is_sent_without_trailing_dot() {
    let name = DnsName::try_from("example.com.").unwrap();
    let ext = ClientExtension::make_sni(&name);

    let mut expected = vec![0x00, 0x00, 0x00, 0x10, 0x00, 0x0e, 0x00, 0x00, 0x0b];
    expected.extend_from_slice(b"example.com");
    assert_eq!(ext.get_encoding(), expected);

    match ClientExtension::read_bytes(&expected).unwrap() {
        ClientExtension::ServerName(names) => {
            assert_eq!(names.len(), 1);
            let dns: &str = names[0].0.as_ref();
            assert_eq!(dns, "example.com");
        }
        other => panic!("unexpected extension {other:?}"),
    }
}

#[test]
fn sni_entry_of_another_name_type_is_refused() {
    let bytes = [0x01u8, 0x00, 0x01, b'a'];
    assert_eq!(
        ServerNameEntry::read_bytes(&bytes).unwrap_err(),
        InvalidMessage::InvalidServerName
    );
}

#[test]
fn can_round_trip_psk_offer() {
    let ext = PresharedKeyOffer {
        identities: vec![PresharedKeyIdentity::new(vec![3, 4, 5], 123456)],
        binders: vec![PresharedKeyBinder::from(vec![1, 2, 3])],
    };

    let bytes = ext.get_encoding();
    let psko = PresharedKeyOffer::read_bytes(&bytes).unwrap();
    assert_eq!(psko, ext);
    assert_eq!(psko.identities[0].identity.0, vec![3, 4, 5]);
    assert_eq!(psko.identities[0].obfuscated_ticket_age, 123456);
    assert_eq!(psko.binders[0].as_ref(), &[1, 2, 3]);
}

#[test]
fn psk_offer_requires_matching_binders() {
    let ext = PresharedKeyOffer {
        identities: vec![PresharedKeyIdentity::new(vec![3, 4, 5], 1)],
        binders: vec![],
    };
    assert_eq!(
        PresharedKeyOffer::read_bytes(&ext.get_encoding()).unwrap_err(),
        InvalidMessage::PskIdentitiesAndBindersMismatch
    );

    let ext = PresharedKeyOffer {
        identities: vec![],
        binders: vec![],
    };
    assert_eq!(
        PresharedKeyOffer::read_bytes(&ext.get_encoding()).unwrap_err(),
        InvalidMessage::IllegalEmptyList("PskIdentities")
    );
}

#[test]
fn test_truncated_psk_offer() {
    let ext = PresharedKeyOffer {
        identities: vec![PresharedKeyIdentity::new(vec![3, 4, 5], 123456)],
        binders: vec![PresharedKeyBinder::from(vec![1, 2, 3])],
    };

    let mut enc = ext.get_encoding();
    println!("testing {ext:?} enc {enc:?}");
    for l in 0..enc.len() {
        if l == 9 {
            continue;
        }
        put_u16(l as u16, &mut enc);
        let rc = PresharedKeyOffer::read_bytes(&enc);
        assert!(rc.is_err());
    }
}

fn sample_psk_offer() -> PresharedKeyOffer {
    PresharedKeyOffer::new(
        PresharedKeyIdentity::new(vec![0x54, 0x49, 0x43, 0x4b], 0x1122_3344),
        vec![0u8; 32],
    )
}

fn sample_client_hello_payload() -> ClientHelloPayload {
    ClientHelloPayload {
        client_version: ProtocolVersion::TLSv1_2,
        random: Random::from([0; 32]),
        session_id: SessionId::empty(),
        cipher_suites: vec![CipherSuite::TLS13_AES_128_GCM_SHA256],
        compression_methods: vec![Compression::Null],
        extensions: vec![
            ClientExtension::make_sni(&DnsName::try_from("hello").unwrap()),
            ClientExtension::SupportedVersions(vec![ProtocolVersion::TLSv1_3]),
            ClientExtension::NamedGroups(vec![NamedGroup::X25519]),
            ClientExtension::SignatureAlgorithms(vec![SignatureScheme::ECDSA_NISTP256_SHA256]),
            ClientExtension::KeyShare(vec![KeyShareEntry::new(NamedGroup::X25519, &[1, 2, 3][..])]),
            ClientExtension::Protocols(vec![ProtocolName::from(b"h2".to_vec())]),
            ClientExtension::PresharedKeyModes(vec![PskKeyExchangeMode::PSK_DHE_KE]),
            ClientExtension::Unknown(UnknownExtension {
                typ: ExtensionType::Unknown(12345),
                payload: Payload::new(vec![1, 2, 3]),
            }),
            ClientExtension::PresharedKey(sample_psk_offer()),
        ],
    }
}

fn sample_server_hello_payload() -> ServerHelloPayload {
    ServerHelloPayload {
        legacy_version: ProtocolVersion::TLSv1_2,
        random: Random::from([0; 32]),
        session_id: SessionId::empty(),
        cipher_suite: CipherSuite::TLS13_AES_128_GCM_SHA256,
        compression_method: Compression::Null,
        extensions: vec![
            ServerExtension::SupportedVersions(ProtocolVersion::TLSv1_3),
            ServerExtension::KeyShare(KeyShareEntry::new(NamedGroup::X25519, &[1, 2, 3][..])),
            ServerExtension::PresharedKey(0),
        ],
    }
}

#[test]
fn client_hello_round_trips_every_extension() {
    let ch = sample_client_hello_payload();
    let back = ClientHelloPayload::read_bytes(&ch.get_encoding()).unwrap();
    assert_eq!(back, ch);
    assert!(!back.has_duplicate_extension());
    assert!(back.check_psk_ext_is_last());
    assert_eq!(back.psk(), Some(&sample_psk_offer()));
}

#[test]
fn client_hello_drops_nothing_from_cipher_suite_list() {
    let mut ch = sample_client_hello_payload();
    ch.cipher_suites
        .push(CipherSuite::Unknown(0x00ff));
    let back = ClientHelloPayload::read_bytes(&ch.get_encoding()).unwrap();
    assert_eq!(back.cipher_suites[1], CipherSuite::Unknown(0x00ff));
}

#[test]
fn test_truncated_client_hello_is_detected() {
    let ch = sample_client_hello_payload();
    let enc = ch.get_encoding();
    println!("testing {ch:?} enc {enc:?}");

    for l in 0..enc.len() {
        assert!(ClientHelloPayload::read_bytes(&enc[..l]).is_err());
    }
}

#[test]
fn test_truncated_client_extension_is_detected() {
    let chp = sample_client_hello_payload();

    let enc = chp.extensions.get_encoding();
    println!("testing enc {enc:?}");

    // "outer" truncation, i.e., where the extension-level length is longer than
    // the input
    for l in 1..enc.len() {
        assert!(Vec::<ClientExtension>::read_bytes(&enc[..l]).is_err());
    }
}

#[test]
fn test_truncated_server_extension_is_detected() {
    let shp = sample_server_hello_payload();

    for ext in &shp.extensions {
        let mut enc = ext.get_encoding();
        println!("testing {ext:?} enc {enc:?}");

        // "outer" truncation, i.e., where the extension-level length is longer than
        // the input
        for l in 0..enc.len() {
            assert!(ServerExtension::read_bytes(&enc[..l]).is_err());
        }

        // "inner" truncation, where the extension-level length agrees with the input
        // length, but isn't long enough for the type of extension
        for l in 0..(enc.len() - 4) {
            put_u16(l as u16, &mut enc[2..]);
            println!("  encoding {enc:?} len {l:?}");
            assert!(ServerExtension::read_bytes(&enc[..4 + l]).is_err());
        }
    }
}

#[test]
fn server_hello_accessors_find_extensions() {
    let shp = sample_server_hello_payload();
    let back = ServerHelloPayload::read_bytes(&shp.get_encoding()).unwrap();
    assert_eq!(back, shp);
    assert_eq!(back.supported_versions(), Some(ProtocolVersion::TLSv1_3));
    assert_eq!(back.psk_index(), Some(0));
    assert_eq!(back.key_share().unwrap().group, NamedGroup::X25519);
    assert!(!back.has_duplicate_extension());

    let mut dup = shp;
    dup.extensions
        .push(ServerExtension::PresharedKey(1));
    assert!(dup.has_duplicate_extension());
}

#[test]
fn server_hello_with_retry_random_decodes_as_hello_retry_request() {
    let mut shp = sample_server_hello_payload();
    shp.random = HELLO_RETRY_REQUEST_RANDOM;
    let hmp = HandshakeMessagePayload {
        typ: HandshakeType::ServerHello,
        payload: HandshakePayload::ServerHello(shp.clone()),
    };

    let back = HandshakeMessagePayload::read_bytes(&hmp.get_encoding()).unwrap();
    assert_eq!(back.typ, HandshakeType::ServerHello);
    assert_eq!(back.payload, HandshakePayload::HelloRetryRequest(shp));
}

#[test]
fn binder_signing_encoding_stops_before_binders() {
    let hmp = HandshakeMessagePayload {
        typ: HandshakeType::ClientHello,
        payload: HandshakePayload::ClientHello(sample_client_hello_payload()),
    };

    let full = hmp.get_encoding();
    let prefix = hmp.get_encoding_for_binder_signing();
    // binders list: u16 length, u8 length, 32 byte binder
    assert_eq!(prefix.len(), full.len() - (2 + 1 + 32));
    assert!(full.starts_with(&prefix));
    assert_eq!(&full[prefix.len()..prefix.len() + 3], &[0x00, 0x21, 0x20]);
}

#[test]
fn binder_signing_encoding_of_other_messages_is_whole() {
    let hmp = HandshakeMessagePayload {
        typ: HandshakeType::Finished,
        payload: HandshakePayload::Finished(Payload::new(vec![1, 2, 3])),
    };
    assert_eq!(hmp.get_encoding_for_binder_signing(), hmp.get_encoding());

    let mut ch = sample_client_hello_payload();
    ch.extensions.swap(0, 8);
    assert!(!ch.check_psk_ext_is_last());
    let hmp = HandshakeMessagePayload {
        typ: HandshakeType::ClientHello,
        payload: HandshakePayload::ClientHello(ch),
    };
    assert_eq!(hmp.get_encoding_for_binder_signing(), hmp.get_encoding());
}

#[test]
fn set_psk_binder_replaces_the_placeholder_in_place() {
    let mut ch = sample_client_hello_payload();
    let before = ch.get_encoding();
    ch.set_psk_binder(vec![0xaa; 32]);
    let after = ch.get_encoding();

    assert_eq!(before.len(), after.len());
    assert_eq!(before[..before.len() - 32], after[..after.len() - 32]);
    assert!(after.ends_with(&[0xaa; 32]));
}

#[test]
fn rejects_unknown_signature_scheme_in_certificate_verify() {
    let bytes = [0x0bu8, 0xad, 0x00, 0x01, 0x00];
    assert_eq!(
        DigitallySignedStruct::read_bytes(&bytes).unwrap_err(),
        InvalidMessage::UnknownSignatureScheme
    );

    let dss = DigitallySignedStruct::new(SignatureScheme::ED25519, vec![1, 2]);
    let back = DigitallySignedStruct::read_bytes(&dss.get_encoding()).unwrap();
    assert_eq!(back.scheme, SignatureScheme::ED25519);
    assert_eq!(back.signature(), &[1, 2]);
}

#[test]
fn certificate_payload_reports_entry_extensions() {
    let mut cert = CertificatePayloadTls13::new(vec![
        CertificateDer::from(vec![1, 2, 3]),
        CertificateDer::from(vec![4, 5]),
    ]);
    assert!(!cert.any_entry_has_extension());

    let back = CertificatePayloadTls13::read_bytes(&cert.get_encoding()).unwrap();
    assert_eq!(back, cert);

    // status_request, empty body
    cert.entries[1].exts = PayloadU16(vec![0x00, 0x05, 0x00, 0x00]);
    assert!(cert.any_entry_has_extension());
    let back = CertificatePayloadTls13::read_bytes(&cert.get_encoding()).unwrap();
    assert_eq!(back.entries[1].exts, cert.entries[1].exts);

    let chain = cert.into_certificate_chain();
    assert_eq!(chain[0].as_ref(), &[1, 2, 3]);
    assert_eq!(chain[1].as_ref(), &[4, 5]);
}

#[test]
fn certificate_entry_rejects_truncated_certificate() {
    let entry = CertificateEntry::new(CertificateDer::from(vec![1, 2, 3]));
    let enc = entry.get_encoding();
    for l in 0..enc.len() {
        assert!(CertificateEntry::read_bytes(&enc[..l]).is_err());
    }
}

#[test]
fn new_session_ticket_extensions_survive_and_duplicates_show() {
    let mut nst = NewSessionTicketPayloadTls13::new(7200, 0x0102_0304, vec![0], vec![9; 16]);
    let early_data = NewSessionTicketExtension::Unknown(UnknownExtension {
        typ: ExtensionType::EarlyData,
        payload: Payload::new(vec![0, 0, 4, 0]),
    });
    nst.exts.push(early_data.clone());

    let back = NewSessionTicketPayloadTls13::read_bytes(&nst.get_encoding()).unwrap();
    assert_eq!(back, nst);
    assert!(!back.has_duplicate_extension());
    assert_eq!(back.nonce, PayloadU8::new(vec![0]));

    nst.exts.push(early_data);
    assert!(nst.has_duplicate_extension());
}

#[test]
fn handshake_message_declaring_too_much_is_rejected() {
    let bytes = [0x14u8, 0x00, 0x00, 0x05, 0x01, 0x02, 0x03, 0x04];
    assert_eq!(
        HandshakeMessagePayload::read_bytes(&bytes).unwrap_err(),
        InvalidMessage::MessageTooShort
    );
}

#[test]
fn handshake_message_with_short_body_is_rejected() {
    // EncryptedExtensions whose extension list is longer than the message
    let bytes = [0x08u8, 0x00, 0x00, 0x02, 0x00, 0x04];
    assert!(HandshakeMessagePayload::read_bytes(&bytes).is_err());

    // ...and one with a spare byte after its extension list
    let bytes = [0x08u8, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00];
    assert_eq!(
        HandshakeMessagePayload::read_bytes(&bytes).unwrap_err(),
        InvalidMessage::TrailingData("HandshakeMessagePayload")
    );
}

#[test]
fn unknown_handshake_types_are_kept_opaque() {
    let bytes = [0x18u8, 0x00, 0x00, 0x01, 0x00];
    let hmp = HandshakeMessagePayload::read_bytes(&bytes).unwrap();
    assert_eq!(hmp.typ, HandshakeType::KeyUpdate);
    assert_eq!(hmp.payload, HandshakePayload::Unknown(Payload::new(vec![0])));
    assert_eq!(hmp.get_encoding(), bytes);
}
