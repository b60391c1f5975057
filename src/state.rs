// Raffle DApp - State
use crate::address::Address;
use crate::utils::{format_ether, format_timestamp, Wei};
use solana_program::clock::UnixTimestamp;

/// Lifecycle state reported by `getRaffleState()`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Closed while a winner is being drawn
    Calculating,
}

impl TryFrom<u8> for RaffleState {
    type Error = &'static str;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(RaffleState::Open),
            1 => Ok(RaffleState::Calculating),
            _ => Err("Invalid raffle state"),
        }
    }
}

impl From<RaffleState> for u8 {
    fn from(state: RaffleState) -> Self {
        match state {
            RaffleState::Open => 0,
            RaffleState::Calculating => 1,
        }
    }
}

/// The connected wallet account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    /// Native balance in wei
    pub balance: Wei,
}

impl Account {
    pub fn balance_display(&self) -> String {
        format_ether(self.balance)
    }
}

/// One consistent read of the raffle contract.
///
/// Built from a single batch of reads and replaced wholesale on the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaffleSnapshot {
    pub state: RaffleState,
    /// Value required to enter, in wei
    pub entrance_fee: Wei,
    /// Contract balance at read time, in wei
    pub prize_pool: Wei,
    pub last_winner: Address,
    /// Unix seconds of the last draw
    pub last_draw: UnixTimestamp,
}

impl RaffleSnapshot {
    pub fn is_open(&self) -> bool {
        self.state == RaffleState::Open
    }

    pub fn entrance_fee_display(&self) -> String {
        format_ether(self.entrance_fee)
    }

    pub fn prize_pool_display(&self) -> String {
        format_ether(self.prize_pool)
    }

    pub fn last_winner_display(&self) -> String {
        self.last_winner.to_checksum()
    }

    pub fn last_draw_display(&self) -> String {
        format_timestamp(self.last_draw)
    }
}
