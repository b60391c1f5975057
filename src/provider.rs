// Raffle DApp - Wallet provider interface
use crate::address::Address;
use crate::error::{ContractError, DappError};
use crate::utils::Wei;
use std::fmt;
use std::future::Future;
use tokio::sync::broadcast;

/// Hash identifying a submitted transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

/// A value-bearing contract call to be signed by the wallet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    /// Value attached to the call, in wei
    pub value: Wei,
    pub data: Vec<u8>,
}

/// Outcome of a mined transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted(ContractError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub status: TxStatus,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

/// A wallet-injected connection to the chain.
///
/// Mirrors the request surface an injected browser wallet exposes: account
/// access, balance reads, read-only contract calls, transaction submission and
/// account-change notifications.
pub trait WalletProvider: Send + Sync {
    /// Prompt the user for account access (`eth_requestAccounts`)
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, DappError>> + Send;

    /// Accounts already authorised for this origin, without prompting
    fn accounts(&self) -> impl Future<Output = Result<Vec<Address>, DappError>> + Send;

    fn balance(&self, address: Address) -> impl Future<Output = Result<Wei, DappError>> + Send;

    /// Read-only call against a contract (`eth_call`)
    fn call(
        &self,
        to: Address,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, DappError>> + Send;

    /// Sign and submit a transaction. Resolves once submitted, not once mined.
    fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> impl Future<Output = Result<TxHash, DappError>> + Send;

    fn wait_for_receipt(&self, hash: TxHash) -> impl Future<Output = Result<Receipt, DappError>> + Send;

    /// Subscribe to `accountsChanged` notifications
    fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<Address>>;

    /// The signer for the first authorised account
    fn signer(&self) -> impl Future<Output = Result<Address, DappError>> + Send {
        async move {
            self.accounts()
                .await?
                .first()
                .copied()
                .ok_or(DappError::NoSigner)
        }
    }
}
