//! # Chat Client Library
//!
//! Terminal client for the line-oriented chat service. It connects to the
//! server, negotiates a username (re-prompting the user for as long as
//! the server keeps asking), and then pumps lines concurrently in both
//! directions: server lines to the screen, terminal lines to the socket.
//!
//! The contract with the terminal is simply "lines in, lines out"; all
//! interpretation of chat input happens server-side.

pub mod network;
