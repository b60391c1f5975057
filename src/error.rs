// Raffle DApp - Errors
use crate::address::Address;
use crate::provider::TxHash;
use thiserror::Error;

/// Errors surfaced by the wallet, contract and presentation layers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DappError {
    /// No browser wallet is available to talk to
    #[error("No wallet provider is installed")]
    WalletNotInstalled,

    /// The user declined a wallet prompt
    #[error("User rejected the request")]
    UserRejected,

    /// An action needed a connected signer and there was none
    #[error("No connected signer")]
    NoSigner,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Contract return data did not match the expected layout
    #[error("Malformed contract data: {0}")]
    MalformedData(&'static str),

    /// Calldata did not match any known selector
    #[error("Unknown contract method")]
    UnknownMethod,

    #[error("No contract deployed at {0}")]
    NoContract(Address),

    #[error("Insufficient funds")]
    InsufficientFunds,

    /// The transaction was mined but the contract reverted it
    #[error("Transaction {0} reverted: {1}")]
    Reverted(TxHash, ContractError),

    /// The contract refused a call outside of a transaction
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Unknown transaction {0}")]
    UnknownTransaction(TxHash),

    /// Transport-level failure reported by the provider
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Revert reasons of the raffle contract
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Entry value was below the entrance fee
    #[error("Raffle__NotEnoughETHEntered")]
    NotEnoughEthEntered,

    /// Raffle is calculating a winner and not accepting entries
    #[error("Raffle__RaffleNotOpen")]
    RaffleNotOpen,

    /// A draw was requested with nobody entered
    #[error("Raffle__NoPlayers")]
    NoPlayers,

    /// The called method is not payable or not callable as a transaction
    #[error("Raffle__UnsupportedCall")]
    UnsupportedCall,
}
