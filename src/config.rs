// Raffle DApp - Configuration
use crate::address::Address;
use crate::error::DappError;
use std::str::FromStr;

pub const CONTRACT_ADDRESS_KEY: &str = "RAFFLE_CONTRACT_ADDRESS";
pub const EXPLORER_URL_KEY: &str = "RAFFLE_EXPLORER_URL";
pub const JOIN_POLICY_KEY: &str = "RAFFLE_JOIN_POLICY";

/// Address pages on the Sepolia block explorer
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io/address/";

/// Where users without a wallet are sent
pub const WALLET_INSTALL_URL: &str = "https://metamask.io/download.html";

/// When a join adds the entrant to the participant list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    /// After the entry transaction is mined successfully
    #[default]
    Confirmed,
    /// Immediately, alongside submission and regardless of its outcome
    Optimistic,
}

impl FromStr for JoinPolicy {
    type Err = DappError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(JoinPolicy::Confirmed),
            "optimistic" => Ok(JoinPolicy::Optimistic),
            other => Err(DappError::Config(format!("unknown join policy `{}`", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DappConfig {
    /// The deployed raffle contract
    pub contract_address: Address,
    /// Prefix joined with an address to build explorer links
    pub explorer_url: String,
    pub join_policy: JoinPolicy,
}

impl DappConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            join_policy: JoinPolicy::default(),
        }
    }

    /// Build a config from a key lookup.
    ///
    /// `RAFFLE_CONTRACT_ADDRESS` wins over `default_contract`; one of them
    /// must be present.
    pub fn from_lookup<F>(lookup: F, default_contract: Option<Address>) -> Result<Self, DappError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contract_address = match lookup(CONTRACT_ADDRESS_KEY) {
            Some(value) => value.parse()?,
            None => default_contract
                .ok_or_else(|| DappError::Config(format!("{} is not set", CONTRACT_ADDRESS_KEY)))?,
        };

        let mut config = Self::new(contract_address);
        if let Some(url) = lookup(EXPLORER_URL_KEY) {
            config.explorer_url = url;
        }
        if let Some(policy) = lookup(JOIN_POLICY_KEY) {
            config.join_policy = policy.parse()?;
        }
        Ok(config)
    }

    /// Build a config from process environment variables
    pub fn from_env(default_contract: Option<Address>) -> Result<Self, DappError> {
        Self::from_lookup(|key| std::env::var(key).ok(), default_contract)
    }
}
