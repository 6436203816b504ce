//! BER (Basic Encoding Rules) encoder and decoder for ASN.1
//!
//! # ASN.1 BER Encoding Overview
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! - **Class** (2 bits): Universal (00), Application (01), Context-specific (10), Private (11)
//! - **Constructed/Primitive** (1 bit): 0 = Primitive, 1 = Constructed
//! - **Tag Number**: 0-30 in the low five bits, or `11111` followed by the
//!   number in base-128 groups (high bit = more groups follow)
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127
//! - **Long form**: `0x80 | n`, then `n` big-endian length bytes
//! - **Indefinite form**: `0x80`; the content runs until the end-of-contents
//!   marker `00 00` (constructed values only)
//!
//! ## BER vs DER
//!
//! The decoder accepts BER by default: indefinite lengths, non-minimal length
//! octets, the high-tag-number form for small numbers, and constructed
//! strings. [`DecodeLimits::der`](vellum_core::DecodeLimits::der) turns all of
//! these into errors. The encoder always writes minimal definite lengths
//! unless asked for the indefinite form.

pub mod decoder;
pub mod encoder;
pub mod types;

pub use decoder::BerDecoder;
pub use encoder::BerEncoder;
pub use types::{BerLength, BerTag, BerTagClass, universal};
