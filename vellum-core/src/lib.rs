//! Core types shared by the vellum crates
//!
//! This crate provides the error taxonomy and the decoder configuration used
//! throughout the ordered tree, ASN.1 codec and OpenPGP packet crates.

pub mod config;
pub mod error;

pub use config::{DecodeLimits, PacketReaderConfig};
pub use error::{VellumError, VellumResult};
