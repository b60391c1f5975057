// Raffle DApp
// Wallet-connected client for an on-chain raffle: account status, raffle state,
// entry and a paginated participant list

// Core modules
pub mod address;
pub mod config;
pub mod error;
pub mod state;
pub mod utils;

// Chain access
pub mod abi;
pub mod contract;
pub mod provider;
pub mod subscription;

// Services
pub mod participants;
pub mod synchronizer;
pub mod wallet;

// Presentation
pub mod app;
pub mod pagination;
pub mod view;

// In-memory chain for local runs and tests
pub mod devnet;

pub use address::Address;
pub use app::{RaffleApp, Session, UiAction};
pub use config::{DappConfig, JoinPolicy};
pub use error::{ContractError, DappError};
pub use provider::WalletProvider;
pub use state::{Account, RaffleSnapshot, RaffleState};
