#![allow(missing_docs)]
//! Wire formats of the TLS 1.3 handshake messages a client sends and receives.
//!
//! Everything here is plain encoding and decoding: whether a decoded message
//! is *acceptable* at a given point of the handshake is decided by the client
//! state machine, not by these types.

#[macro_use]
mod macros;

pub mod base;
pub mod codec;
pub mod enums;
pub mod handshake;
pub mod message;
pub mod persist;

#[cfg(test)]
mod handshake_test;
