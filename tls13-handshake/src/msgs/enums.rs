#![allow(clippy::upper_case_acronyms)]
#![allow(non_camel_case_types)]

enum_builder! {
    /// Hash functions, by their TLS1.2 `HashAlgorithm` codepoint.  Only
    /// used here to say which hash a cipher suite runs on.
    #[repr(u8)]
    pub enum HashAlgorithm {
        SHA256 => 0x04,
        SHA384 => 0x05,
    }
}

enum_builder! {
    /// Legacy ClientHello/ServerHello compression methods.  TLS1.3 only
    /// permits `Null`.
    #[repr(u8)]
    pub enum Compression {
        Null => 0x00,
    }
}

enum_builder! {
    /// Hello extension codepoints.  Anything not named here is carried as
    /// `Unknown` with its value intact.
    #[repr(u16)]
    pub enum ExtensionType {
        ServerName => 0x0000,
        EllipticCurves => 0x000a,
        SignatureAlgorithms => 0x000d,
        ALProtocolNegotiation => 0x0010,
        PreSharedKey => 0x0029,
        EarlyData => 0x002a,
        SupportedVersions => 0x002b,
        PSKKeyExchangeModes => 0x002d,
        KeyShare => 0x0033,
    }
}

enum_builder! {
    #[repr(u8)]
    pub enum ServerNameType {
        HostName => 0x00,
    }
}

enum_builder! {
    /// Key exchange groups for `supported_groups` and `key_share`.
    #[repr(u16)]
    pub enum NamedGroup {
        secp256r1 => 0x0017,
        secp384r1 => 0x0018,
        X25519 => 0x001d,
    }
}

enum_builder! {
    #[repr(u8)]
    pub enum PskKeyExchangeMode {
        PSK_KE => 0x00,
        PSK_DHE_KE => 0x01,
    }
}
