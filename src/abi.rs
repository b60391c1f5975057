// Raffle DApp - Contract call encoding
use crate::address::Address;
use crate::error::DappError;
use crate::utils::Wei;
use arrayref::{array_ref, array_refs};
use solana_program::{clock::UnixTimestamp, keccak};

/// Length of a function selector
pub const SELECTOR_LEN: usize = 4;

/// Length of an encoded return word
pub const WORD_LEN: usize = 32;

/// Methods of the raffle contract consumed by the client.
///
/// Every call takes no arguments, so calldata is the 4-byte selector alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleCall {
    /// `getEntranceFee() returns (uint256)`
    GetEntranceFee,

    /// `getRaffleState() returns (uint8)`; 0 = open, 1 = calculating
    GetRaffleState,

    /// `getRecentWinner() returns (address)`
    GetRecentWinner,

    /// `getLastTimeStamp() returns (uint256)`; seconds of the last draw
    GetLastTimeStamp,

    /// `enterRaffle()`, payable with at least the entrance fee as value
    EnterRaffle,
}

impl RaffleCall {
    pub const ALL: [RaffleCall; 5] = [
        RaffleCall::GetEntranceFee,
        RaffleCall::GetRaffleState,
        RaffleCall::GetRecentWinner,
        RaffleCall::GetLastTimeStamp,
        RaffleCall::EnterRaffle,
    ];

    pub fn signature(self) -> &'static str {
        match self {
            RaffleCall::GetEntranceFee => "getEntranceFee()",
            RaffleCall::GetRaffleState => "getRaffleState()",
            RaffleCall::GetRecentWinner => "getRecentWinner()",
            RaffleCall::GetLastTimeStamp => "getLastTimeStamp()",
            RaffleCall::EnterRaffle => "enterRaffle()",
        }
    }

    /// First four bytes of `keccak256(signature)`
    pub fn selector(self) -> [u8; SELECTOR_LEN] {
        let hash = keccak::hash(self.signature().as_bytes()).to_bytes();
        *array_ref![hash, 0, SELECTOR_LEN]
    }

    pub fn is_payable(self) -> bool {
        matches!(self, RaffleCall::EnterRaffle)
    }

    /// Packs the call into calldata
    pub fn pack(self) -> Vec<u8> {
        self.selector().to_vec()
    }

    /// Unpacks calldata into a RaffleCall
    pub fn unpack(input: &[u8]) -> Result<Self, DappError> {
        let selector = input.get(..SELECTOR_LEN).ok_or(DappError::UnknownMethod)?;
        Self::ALL
            .into_iter()
            .find(|call| call.selector()[..] == selector[..])
            .ok_or(DappError::UnknownMethod)
    }
}

/// Encode an unsigned value as a big-endian 32-byte word
pub fn encode_uint(value: u128) -> Vec<u8> {
    let mut word = vec![0u8; WORD_LEN];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encode an address left-padded to 32 bytes
pub fn encode_address(address: &Address) -> Vec<u8> {
    let mut word = vec![0u8; WORD_LEN];
    word[12..].copy_from_slice(address.as_ref());
    word
}

fn first_word(data: &[u8]) -> Result<&[u8; WORD_LEN], DappError> {
    if data.len() < WORD_LEN {
        return Err(DappError::MalformedData("return data shorter than one word"));
    }
    Ok(array_ref![data, 0, WORD_LEN])
}

/// Decode a `uint256` return value. Values that do not fit 128 bits are rejected.
pub fn decode_uint(data: &[u8]) -> Result<Wei, DappError> {
    let word = first_word(data)?;
    let (high, low) = array_refs![word, 16, 16];
    if high.iter().any(|b| *b != 0) {
        return Err(DappError::MalformedData("uint256 exceeds 128 bits"));
    }
    Ok(u128::from_be_bytes(*low))
}

pub fn decode_u8(data: &[u8]) -> Result<u8, DappError> {
    u8::try_from(decode_uint(data)?).map_err(|_| DappError::MalformedData("uint8 out of range"))
}

pub fn decode_address(data: &[u8]) -> Result<Address, DappError> {
    let word = first_word(data)?;
    let (padding, address) = array_refs![word, 12, 20];
    if padding.iter().any(|b| *b != 0) {
        return Err(DappError::MalformedData("address word has dirty padding"));
    }
    Ok(Address::new_from_array(*address))
}

pub fn decode_timestamp(data: &[u8]) -> Result<UnixTimestamp, DappError> {
    UnixTimestamp::try_from(decode_uint(data)?)
        .map_err(|_| DappError::MalformedData("timestamp out of range"))
}
