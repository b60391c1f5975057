// Raffle DApp - Local development chain
//
// An in-memory chain with one injected wallet, used by the demo binary and the
// integration tests. Contract storage is kept packed, the way an on-chain
// account holds it, and every call unpacks it afresh.
use crate::abi::{self, RaffleCall};
use crate::address::Address;
use crate::error::{ContractError, DappError};
use crate::provider::{Receipt, TransactionRequest, TxHash, TxStatus, WalletProvider};
use crate::state::RaffleState;
use crate::utils::{pick_index, Wei};
use borsh::{BorshDeserialize, BorshSerialize};
use log::{debug, info};
use solana_program::{clock::UnixTimestamp, keccak};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

/// Chain clock at genesis (2023-11-14 22:13:20 UTC)
pub const GENESIS_TIMESTAMP: UnixTimestamp = 1_700_000_000;

const NOTIFICATION_CAPACITY: usize = 16;

/// Raffle contract storage
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaffleStorage {
    /// Minimum entry value in wei
    pub entrance_fee: u128,
    /// 0 = open, 1 = calculating
    pub state: u8,
    pub recent_winner: [u8; 20],
    /// Time of the last draw (or deployment)
    pub last_timestamp: UnixTimestamp,
    /// Entrants of the current round, in entry order
    pub players: Vec<[u8; 20]>,
}

impl RaffleStorage {
    pub fn new(entrance_fee: Wei, now: UnixTimestamp) -> Self {
        Self {
            entrance_fee,
            state: RaffleState::Open.into(),
            recent_winner: [0u8; 20],
            last_timestamp: now,
            players: Vec::new(),
        }
    }

    pub fn pack(&self) -> Result<Vec<u8>, DappError> {
        self.try_to_vec()
            .map_err(|e| DappError::Provider(format!("storage encode failed: {}", e)))
    }

    pub fn unpack(data: &[u8]) -> Result<Self, DappError> {
        Self::try_from_slice(data)
            .map_err(|e| DappError::Provider(format!("storage decode failed: {}", e)))
    }

    pub fn raffle_state(&self) -> Result<RaffleState, DappError> {
        RaffleState::try_from(self.state).map_err(DappError::MalformedData)
    }
}

struct Chain {
    balances: HashMap<Address, Wei>,
    contracts: HashMap<Address, Vec<u8>>,
    wallet_accounts: Vec<Address>,
    selected: Option<Address>,
    authorized: bool,
    reject_requests: bool,
    fail_balance_reads: bool,
    latency: Option<Duration>,
    receipts: HashMap<TxHash, Receipt>,
    block_number: u64,
    tx_count: u64,
    now: UnixTimestamp,
}

impl Chain {
    fn balance_of(&self, address: &Address) -> Wei {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Wei) -> Result<(), DappError> {
        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(DappError::InsufficientFunds);
        }
        self.balances.insert(from, from_balance - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    fn storage(&self, contract: &Address) -> Result<RaffleStorage, DappError> {
        let data = self
            .contracts
            .get(contract)
            .ok_or(DappError::NoContract(*contract))?;
        RaffleStorage::unpack(data)
    }

    fn store(&mut self, contract: Address, storage: &RaffleStorage) -> Result<(), DappError> {
        self.contracts.insert(contract, storage.pack()?);
        Ok(())
    }

    /// Run a transaction against its target and report how it ended
    fn execute(&mut self, tx: &TransactionRequest) -> Result<TxStatus, DappError> {
        if !self.contracts.contains_key(&tx.to) {
            // Plain value transfer
            self.transfer(tx.from, tx.to, tx.value)?;
            return Ok(TxStatus::Success);
        }

        let call = match RaffleCall::unpack(&tx.data) {
            Ok(call) => call,
            Err(_) => return Ok(TxStatus::Reverted(ContractError::UnsupportedCall)),
        };
        if !call.is_payable() {
            return Ok(TxStatus::Reverted(ContractError::UnsupportedCall));
        }

        let mut storage = self.storage(&tx.to)?;
        if tx.value < storage.entrance_fee {
            return Ok(TxStatus::Reverted(ContractError::NotEnoughEthEntered));
        }
        if storage.raffle_state()? != RaffleState::Open {
            return Ok(TxStatus::Reverted(ContractError::RaffleNotOpen));
        }

        self.transfer(tx.from, tx.to, tx.value)?;
        storage.players.push(tx.from.to_bytes());
        self.store(tx.to, &storage)?;
        debug!("RaffleEnter({}) on {}", tx.from, tx.to);
        Ok(TxStatus::Success)
    }
}

/// In-memory chain plus an injected wallet holding a set of accounts
pub struct LocalDevnet {
    chain: Mutex<Chain>,
    accounts_changed: broadcast::Sender<Vec<Address>>,
}

impl Default for LocalDevnet {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalDevnet {
    pub fn new() -> Self {
        let (accounts_changed, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            chain: Mutex::new(Chain {
                balances: HashMap::new(),
                contracts: HashMap::new(),
                wallet_accounts: Vec::new(),
                selected: None,
                authorized: false,
                reject_requests: false,
                fail_balance_reads: false,
                latency: None,
                receipts: HashMap::new(),
                block_number: 0,
                tx_count: 0,
                now: GENESIS_TIMESTAMP,
            }),
            accounts_changed,
        }
    }

    fn chain(&self) -> Result<MutexGuard<'_, Chain>, DappError> {
        self.chain
            .lock()
            .map_err(|_| DappError::Provider("devnet state poisoned".to_string()))
    }

    async fn pause(&self) -> Result<(), DappError> {
        let latency = self.chain()?.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }

    fn notify(&self, accounts: Vec<Address>) {
        // Nobody listening is fine
        let _ = self.accounts_changed.send(accounts);
    }

    /// Number of live `accountsChanged` subscribers
    pub fn listener_count(&self) -> usize {
        self.accounts_changed.receiver_count()
    }

    /// Create a wallet account funded with `balance`. The first one becomes selected.
    pub fn add_account(&self, balance: Wei) -> Result<Address, DappError> {
        let mut chain = self.chain()?;
        let seed = format!("devnet-account-{}", chain.wallet_accounts.len());
        let address = Address::derive(seed.as_bytes());

        chain.wallet_accounts.push(address);
        chain.balances.insert(address, balance);
        if chain.selected.is_none() {
            chain.selected = Some(address);
        }
        Ok(address)
    }

    pub fn fund(&self, address: Address, amount: Wei) -> Result<(), DappError> {
        let mut chain = self.chain()?;
        *chain.balances.entry(address).or_insert(0) += amount;
        Ok(())
    }

    /// Deploy a raffle contract and return its address
    pub fn deploy_raffle(&self, entrance_fee: Wei) -> Result<Address, DappError> {
        let mut chain = self.chain()?;
        let seed = format!("devnet-raffle-{}", chain.contracts.len());
        let address = Address::derive(seed.as_bytes());

        let storage = RaffleStorage::new(entrance_fee, chain.now);
        chain.store(address, &storage)?;
        chain.balances.insert(address, 0);
        info!("Raffle deployed at {}", address);
        Ok(address)
    }

    /// Switch the wallet's active account, notifying listeners if authorised
    pub fn select_account(&self, address: Address) -> Result<(), DappError> {
        let authorized = {
            let mut chain = self.chain()?;
            if !chain.wallet_accounts.contains(&address) {
                return Err(DappError::InvalidAddress(address.to_checksum()));
            }
            chain.selected = Some(address);
            chain.authorized
        };
        if authorized {
            self.notify(vec![address]);
        }
        Ok(())
    }

    /// Revoke the site's account access
    pub fn disconnect(&self) -> Result<(), DappError> {
        self.chain()?.authorized = false;
        self.notify(Vec::new());
        Ok(())
    }

    /// Make the wallet decline every access prompt
    pub fn reject_requests(&self, reject: bool) -> Result<(), DappError> {
        self.chain()?.reject_requests = reject;
        Ok(())
    }

    /// Make every balance read fail
    pub fn fail_balance_reads(&self, fail: bool) -> Result<(), DappError> {
        self.chain()?.fail_balance_reads = fail;
        Ok(())
    }

    /// Delay applied to every provider request
    pub fn set_latency(&self, latency: Option<Duration>) -> Result<(), DappError> {
        self.chain()?.latency = latency;
        Ok(())
    }

    pub fn now(&self) -> Result<UnixTimestamp, DappError> {
        Ok(self.chain()?.now)
    }

    pub fn advance_time(&self, seconds: i64) -> Result<UnixTimestamp, DappError> {
        let mut chain = self.chain()?;
        chain.now += seconds;
        Ok(chain.now)
    }

    pub fn set_raffle_state(&self, contract: Address, state: RaffleState) -> Result<(), DappError> {
        let mut chain = self.chain()?;
        let mut storage = chain.storage(&contract)?;
        storage.state = state.into();
        chain.store(contract, &storage)
    }

    pub fn storage(&self, contract: Address) -> Result<RaffleStorage, DappError> {
        self.chain()?.storage(&contract)
    }

    /// Pick a winner among the current players and pay out the whole pool
    pub fn draw_winner(&self, contract: Address) -> Result<Address, DappError> {
        let mut chain = self.chain()?;
        let mut storage = chain.storage(&contract)?;
        if storage.players.is_empty() {
            return Err(ContractError::NoPlayers.into());
        }

        let now = chain.now;
        let seed = keccak::hashv(&[
            &storage.last_timestamp.to_le_bytes(),
            &now.to_le_bytes(),
            &(storage.players.len() as u64).to_le_bytes(),
        ])
        .to_bytes();
        let index = pick_index(&seed, storage.players.len()).ok_or(ContractError::NoPlayers)?;
        let winner = Address::new_from_array(storage.players[index]);

        let pool = chain.balance_of(&contract);
        chain.transfer(contract, winner, pool)?;

        storage.recent_winner = winner.to_bytes();
        storage.players.clear();
        storage.state = RaffleState::Open.into();
        storage.last_timestamp = now;
        chain.store(contract, &storage)?;
        chain.block_number += 1;

        info!("WinnerPicked({}) on {}", winner, contract);
        Ok(winner)
    }

    fn read_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, DappError> {
        let chain = self.chain()?;
        let storage = chain.storage(&to)?;

        Ok(match RaffleCall::unpack(data)? {
            RaffleCall::GetEntranceFee => abi::encode_uint(storage.entrance_fee),
            RaffleCall::GetRaffleState => abi::encode_uint(storage.state as u128),
            RaffleCall::GetRecentWinner => {
                abi::encode_address(&Address::new_from_array(storage.recent_winner))
            }
            RaffleCall::GetLastTimeStamp => abi::encode_uint(storage.last_timestamp.max(0) as u128),
            RaffleCall::EnterRaffle => return Err(ContractError::UnsupportedCall.into()),
        })
    }

    fn submit(&self, tx: TransactionRequest) -> Result<TxHash, DappError> {
        let mut chain = self.chain()?;
        if !chain.authorized || chain.selected != Some(tx.from) {
            return Err(DappError::NoSigner);
        }
        if chain.balance_of(&tx.from) < tx.value {
            return Err(DappError::InsufficientFunds);
        }

        chain.tx_count += 1;
        let tx_hash = TxHash(
            keccak::hashv(&[tx.from.as_ref(), &chain.tx_count.to_le_bytes()]).to_bytes(),
        );
        let status = chain.execute(&tx)?;
        chain.block_number += 1;

        let receipt = Receipt {
            tx_hash,
            block_number: chain.block_number,
            status,
        };
        chain.receipts.insert(tx_hash, receipt);
        debug!("Mined {} in block {}: {:?}", tx_hash, receipt.block_number, status);
        Ok(tx_hash)
    }
}

impl WalletProvider for LocalDevnet {
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError> {
        self.pause().await?;
        let mut chain = self.chain()?;
        if chain.reject_requests {
            return Err(DappError::UserRejected);
        }
        chain.authorized = true;
        Ok(chain.selected.into_iter().collect())
    }

    async fn accounts(&self) -> Result<Vec<Address>, DappError> {
        self.pause().await?;
        let chain = self.chain()?;
        if !chain.authorized {
            return Ok(Vec::new());
        }
        Ok(chain.selected.into_iter().collect())
    }

    async fn balance(&self, address: Address) -> Result<Wei, DappError> {
        self.pause().await?;
        let chain = self.chain()?;
        if chain.fail_balance_reads {
            return Err(DappError::Provider("balance read failed".to_string()));
        }
        Ok(chain.balance_of(&address))
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, DappError> {
        self.pause().await?;
        self.read_call(to, &data)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DappError> {
        self.pause().await?;
        self.submit(tx)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt, DappError> {
        self.pause().await?;
        self.chain()?
            .receipts
            .get(&hash)
            .copied()
            .ok_or(DappError::UnknownTransaction(hash))
    }

    fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<Address>> {
        self.accounts_changed.subscribe()
    }
}
