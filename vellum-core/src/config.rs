//! Decoder configuration
//!
//! Length fields read from the wire are attacker controlled. Every decoder in
//! the workspace checks them against the remaining input and against the limits
//! configured here before allocating anything.

use serde::{Deserialize, Serialize};

/// Default maximum content length of a single ASN.1 element (16 MiB)
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum nesting depth of constructed ASN.1 elements
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum body length of a single OpenPGP packet (64 MiB)
pub const DEFAULT_MAX_PACKET_LENGTH: usize = 64 * 1024 * 1024;

/// Default maximum number of partial-body chunks per OpenPGP packet
pub const DEFAULT_MAX_PARTIAL_CHUNKS: usize = 65_536;

/// Limits applied while decoding BER/DER input
///
/// # Defaults
/// - `max_content_length`: 16 MiB
/// - `max_depth`: 64
/// - `allow_indefinite`: true
/// - `strict_der`: false
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Largest content length accepted for any single element
    pub max_content_length: usize,
    /// Deepest nesting of constructed elements accepted
    pub max_depth: usize,
    /// Whether the indefinite length form is accepted at all
    pub allow_indefinite: bool,
    /// Reject every BER-only encoding option (indefinite lengths, non-minimal
    /// length octets, high-tag form for numbers below 31)
    pub strict_der: bool,
}

impl DecodeLimits {
    /// Limits accepting DER only
    pub fn der() -> Self {
        Self {
            allow_indefinite: false,
            strict_der: true,
            ..Self::default()
        }
    }

    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_indefinite(mut self, allow: bool) -> Self {
        self.allow_indefinite = allow;
        self
    }

    pub fn with_strict_der(mut self, strict: bool) -> Self {
        self.strict_der = strict;
        if strict {
            self.allow_indefinite = false;
        }
        self
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            allow_indefinite: true,
            strict_der: false,
        }
    }
}

/// Limits applied by the OpenPGP packet reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketReaderConfig {
    /// Largest packet body accepted, summed over all partial chunks
    pub max_packet_length: usize,
    /// Largest number of partial-body chunks accepted for one packet
    pub max_partial_chunks: usize,
}

impl PacketReaderConfig {
    pub fn with_max_packet_length(mut self, max: usize) -> Self {
        self.max_packet_length = max;
        self
    }

    pub fn with_max_partial_chunks(mut self, max: usize) -> Self {
        self.max_partial_chunks = max;
        self
    }
}

impl Default for PacketReaderConfig {
    fn default() -> Self {
        Self {
            max_packet_length: DEFAULT_MAX_PACKET_LENGTH,
            max_partial_chunks: DEFAULT_MAX_PARTIAL_CHUNKS,
        }
    }
}
