// Raffle DApp - Raffle contract binding
use crate::abi::{self, RaffleCall};
use crate::address::Address;
use crate::error::DappError;
use crate::provider::{TransactionRequest, TxHash, WalletProvider};
use crate::state::RaffleState;
use crate::utils::Wei;
use log::debug;
use solana_program::clock::UnixTimestamp;
use std::sync::Arc;

/// A deployed raffle contract reached through a wallet provider
pub struct RaffleContract<P> {
    provider: Arc<P>,
    address: Address,
}

impl<P> Clone for RaffleContract<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            address: self.address,
        }
    }
}

impl<P: WalletProvider> RaffleContract<P> {
    pub fn new(provider: Arc<P>, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    async fn read(&self, call: RaffleCall) -> Result<Vec<u8>, DappError> {
        debug!("eth_call {} on {}", call.signature(), self.address);
        self.provider.call(self.address, call.pack()).await
    }

    /// Native balance held by the contract, i.e. the prize pool
    pub async fn balance(&self) -> Result<Wei, DappError> {
        self.provider.balance(self.address).await
    }

    pub async fn get_entrance_fee(&self) -> Result<Wei, DappError> {
        abi::decode_uint(&self.read(RaffleCall::GetEntranceFee).await?)
    }

    pub async fn get_raffle_state(&self) -> Result<RaffleState, DappError> {
        let raw = abi::decode_u8(&self.read(RaffleCall::GetRaffleState).await?)?;
        RaffleState::try_from(raw).map_err(DappError::MalformedData)
    }

    pub async fn get_recent_winner(&self) -> Result<Address, DappError> {
        abi::decode_address(&self.read(RaffleCall::GetRecentWinner).await?)
    }

    pub async fn get_last_timestamp(&self) -> Result<UnixTimestamp, DappError> {
        abi::decode_timestamp(&self.read(RaffleCall::GetLastTimeStamp).await?)
    }

    /// Submit `enterRaffle()` from `from` carrying `value`
    pub async fn enter_raffle(&self, from: Address, value: Wei) -> Result<TxHash, DappError> {
        let tx = TransactionRequest {
            from,
            to: self.address,
            value,
            data: RaffleCall::EnterRaffle.pack(),
        };
        self.provider.send_transaction(tx).await
    }
}
