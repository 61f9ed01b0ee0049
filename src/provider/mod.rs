pub mod error;
pub mod payload;
pub mod request_client;
pub mod transport;
mod xml;
