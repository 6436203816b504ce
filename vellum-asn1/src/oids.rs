//! Well-known object identifiers

use crate::primitive::ObjectIdentifier;

// Digests
pub const SHA1: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 3, 14, 3, 2, 26]);
pub const SHA256: ObjectIdentifier =
    ObjectIdentifier::from_static(&[2, 16, 840, 1, 101, 3, 4, 2, 1]);
pub const SHA384: ObjectIdentifier =
    ObjectIdentifier::from_static(&[2, 16, 840, 1, 101, 3, 4, 2, 2]);
pub const SHA512: ObjectIdentifier =
    ObjectIdentifier::from_static(&[2, 16, 840, 1, 101, 3, 4, 2, 3]);

// PKCS#1
pub const RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 1, 1]);
pub const MGF1: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 1, 8]);
pub const RSASSA_PSS: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 1, 10]);
pub const SHA256_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 1, 11]);

// PKCS#5
pub const PBKDF2: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 5, 12]);
pub const PBES2: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 5, 13]);
pub const HMAC_WITH_SHA1: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 2, 7]);
pub const HMAC_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 2, 9]);

// PKCS#7 content types
pub const DATA: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 7, 1]);
pub const SIGNED_DATA: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 7, 2]);
pub const ENVELOPED_DATA: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 7, 3]);
pub const ENCRYPTED_DATA: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 2, 840, 113549, 1, 7, 6]);

// Elliptic curves
pub const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 2, 840, 10045, 2, 1]);
pub const ED25519: ObjectIdentifier = ObjectIdentifier::from_static(&[1, 3, 101, 112]);

// X.500 attributes
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::from_static(&[2, 5, 4, 3]);
pub const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::from_static(&[2, 5, 4, 6]);
pub const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::from_static(&[2, 5, 4, 10]);

// X.509 extensions
pub const KEY_USAGE: ObjectIdentifier = ObjectIdentifier::from_static(&[2, 5, 29, 15]);
pub const SUBJECT_ALT_NAME: ObjectIdentifier = ObjectIdentifier::from_static(&[2, 5, 29, 17]);
pub const BASIC_CONSTRAINTS: ObjectIdentifier = ObjectIdentifier::from_static(&[2, 5, 29, 19]);

// OCSP
pub const OCSP_BASIC: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 3, 6, 1, 5, 5, 7, 48, 1, 1]);
pub const OCSP_NONCE: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 3, 6, 1, 5, 5, 7, 48, 1, 2]);

// CRMF registration controls
pub const REG_CTRL_REG_TOKEN: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 3, 6, 1, 5, 5, 7, 5, 1, 1]);
pub const REG_CTRL_AUTHENTICATOR: ObjectIdentifier =
    ObjectIdentifier::from_static(&[1, 3, 6, 1, 5, 5, 7, 5, 1, 2]);
