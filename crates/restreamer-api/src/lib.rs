// restreamer-api: Async Rust client for the datarhei Restreamer core API
//
// One `RestreamerClient` owns a connection, a bearer-token session and the
// transport. Endpoint families are inherent methods split across the
// `client` submodules.

pub mod client;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod multistream;
pub mod release;
pub mod session;
pub mod transport;

mod lenient;

pub use client::{RestreamerClient, error_message};
pub use connection::{ClientConfig, Connection};
pub use error::{Error, ErrorCategory};
pub use models::*;
pub use multistream::{Destination, Multistream, Orientation, Platform};
pub use release::Release;
pub use session::{SessionManager, SessionState};
pub use transport::{Body, HttpTransport, TlsMode, TransportConfig, TransportResponse};
