// Raffle DApp - Account addresses
use crate::error::DappError;
use solana_program::keccak;
use std::fmt;
use std::str::FromStr;

/// A 20-byte account address, displayed in EIP-55 checksum form
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// The zero address, reported by the contract before any draw
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new_from_array(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 20] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Derive an address from the trailing 20 bytes of `keccak256(seed)`
    pub fn derive(seed: &[u8]) -> Self {
        let hash = keccak::hash(seed).to_bytes();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// EIP-55 mixed-case checksum encoding
    pub fn to_checksum(&self) -> String {
        let lower: String = self.0.iter().map(|b| format!("{:02x}", b)).collect();
        let hash = keccak::hash(lower.as_bytes()).to_bytes();

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = DappError;

    /// Accepts `0x`-prefixed or bare hex in any case. Checksums are not enforced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        // from_str_radix alone would take a leading `+`
        if hex.len() != Self::LEN * 2 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DappError::InvalidAddress(s.to_string()));
        }

        let mut bytes = [0u8; 20];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| DappError::InvalidAddress(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
