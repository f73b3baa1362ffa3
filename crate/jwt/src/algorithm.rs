use openssl::{hash::MessageDigest, nid::Nid};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// JOSE signature algorithm families, used to match key material against
/// the requested algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    Hmac,
    Rsa,
    RsaPss,
    Ecdsa,
}

/// The JOSE `alg` header values accepted for signing and verification.
#[derive(
    Debug, Display, Serialize, Deserialize, EnumString, Clone, Copy, PartialEq, Eq, Hash, Default,
)]
pub enum Algorithm {
    ES256,
    ES384,
    ES512,
    #[default]
    HS256,
    HS384,
    HS512,
    PS256,
    PS384,
    PS512,
    RS256,
    RS384,
    RS512,
}

impl Algorithm {
    pub const fn family(self) -> AlgorithmFamily {
        match self {
            Self::ES256 | Self::ES384 | Self::ES512 => AlgorithmFamily::Ecdsa,
            Self::HS256 | Self::HS384 | Self::HS512 => AlgorithmFamily::Hmac,
            Self::PS256 | Self::PS384 | Self::PS512 => AlgorithmFamily::RsaPss,
            Self::RS256 | Self::RS384 | Self::RS512 => AlgorithmFamily::Rsa,
        }
    }

    pub fn message_digest(self) -> MessageDigest {
        match self {
            Self::ES256 | Self::HS256 | Self::PS256 | Self::RS256 => MessageDigest::sha256(),
            Self::ES384 | Self::HS384 | Self::PS384 | Self::RS384 => MessageDigest::sha384(),
            Self::ES512 | Self::HS512 | Self::PS512 | Self::RS512 => MessageDigest::sha512(),
        }
    }

    /// Byte width of each of the `r` and `s` components in a JOSE ECDSA
    /// signature. Only meaningful for the ES* variants.
    pub const fn ecdsa_component_len(self) -> usize {
        match self {
            Self::ES384 => 48,
            // P-521 coordinates are 521 bits, rounded up to 66 bytes
            Self::ES512 => 66,
            _ => 32,
        }
    }

    /// The elliptic curve the ES* variants sign on.
    pub const fn ecdsa_curve(self) -> Nid {
        match self {
            Self::ES384 => Nid::SECP384R1,
            Self::ES512 => Nid::SECP521R1,
            _ => Nid::X9_62_PRIME256V1,
        }
    }
}
