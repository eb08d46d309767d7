mod client_conn;
pub use client_conn::{ClientHandshake, Status};

mod config;
pub use config::ClientConfig;

mod events;
pub use events::{MessageSender, NoStatusEvents, StatusEvents};

mod hs;
mod tls13;
