//! Typed leaf values

pub mod bit_string;
pub mod integer;
pub mod oid;
pub mod string;
pub mod time;

pub use bit_string::BitString;
pub use integer::Integer;
pub use oid::ObjectIdentifier;
pub use string::{Asn1String, StringKind};
pub use time::{GeneralizedTime, UtcTime};
