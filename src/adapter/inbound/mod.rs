//! Inbound adapters (driving side): the command line and the HTTP server.

pub mod cli;
pub mod http;
