// Raffle DApp - Raffle state synchronizer
use crate::address::Address;
use crate::contract::RaffleContract;
use crate::error::DappError;
use crate::provider::{TxHash, TxStatus, WalletProvider};
use crate::state::{Account, RaffleSnapshot};
use crate::subscription::Subscription;
use crate::utils::{format_ether, Wei};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// An entry submitted to the contract but not yet mined
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingEntry {
    pub tx_hash: TxHash,
    pub entrant: Address,
    /// Fee attached as value, in wei
    pub value: Wei,
}

/// Reads the raffle contract and publishes whole snapshots of its state
pub struct RaffleSynchronizer<P> {
    contract: RaffleContract<P>,
    snapshot: Arc<watch::Sender<Option<RaffleSnapshot>>>,
    generation: Arc<AtomicU64>,
}

impl<P> Clone for RaffleSynchronizer<P> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            snapshot: Arc::clone(&self.snapshot),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<P: WalletProvider + 'static> RaffleSynchronizer<P> {
    pub fn new(contract: RaffleContract<P>) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            contract,
            snapshot: Arc::new(snapshot),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn contract(&self) -> &RaffleContract<P> {
        &self.contract
    }

    /// Latest published snapshot, `None` until the first refresh completes
    pub fn snapshot(&self) -> Option<RaffleSnapshot> {
        *self.snapshot.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<Option<RaffleSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Issue the five contract reads concurrently and publish them together.
    ///
    /// Returns `Ok(None)` when a newer refresh started while this one was in
    /// flight; its result is dropped so it cannot overwrite newer state.
    pub async fn refresh(&self) -> Result<Option<RaffleSnapshot>, DappError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (prize_pool, entrance_fee, state, last_winner, last_draw) = tokio::try_join!(
            self.contract.balance(),
            self.contract.get_entrance_fee(),
            self.contract.get_raffle_state(),
            self.contract.get_recent_winner(),
            self.contract.get_last_timestamp(),
        )?;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("Discarding raffle snapshot #{}, a newer read is in flight", ticket);
            return Ok(None);
        }

        let snapshot = RaffleSnapshot {
            state,
            entrance_fee,
            prize_pool,
            last_winner,
            last_draw,
        };
        debug!("Publishing raffle snapshot #{}: {:?}", ticket, snapshot);
        self.snapshot.send_replace(Some(snapshot));
        Ok(Some(snapshot))
    }

    /// Re-read the snapshot whenever the connected signer changes
    pub fn track_signer(&self, mut accounts: watch::Receiver<Option<Account>>) -> Subscription {
        let synchronizer = self.clone();
        let mut last_signer = accounts.borrow().as_ref().map(|account| account.address);

        Subscription::spawn(async move {
            while accounts.changed().await.is_ok() {
                let signer = accounts
                    .borrow_and_update()
                    .as_ref()
                    .map(|account| account.address);
                if signer == last_signer {
                    continue;
                }
                last_signer = signer;

                info!("Signer changed, refreshing raffle state");
                if let Err(err) = synchronizer.refresh().await {
                    warn!("Raffle refresh failed: {}", err);
                }
            }
        })
    }

    /// Re-read the entrance fee and submit an entry carrying it as value.
    ///
    /// Resolves on submission. The snapshot is left as is.
    pub async fn enter_raffle(&self) -> Result<PendingEntry, DappError> {
        let entrant = self.contract.provider().signer().await?;
        let value = self.contract.get_entrance_fee().await?;
        info!("Entering raffle as {} with {} ETH", entrant, format_ether(value));

        let tx_hash = self.contract.enter_raffle(entrant, value).await?;
        debug!("Entry submitted: {}", tx_hash);
        Ok(PendingEntry {
            tx_hash,
            entrant,
            value,
        })
    }

    /// Wait for a submitted entry to be mined
    pub async fn confirm(&self, pending: PendingEntry) -> Result<Address, DappError> {
        let receipt = self
            .contract
            .provider()
            .wait_for_receipt(pending.tx_hash)
            .await?;

        match receipt.status {
            TxStatus::Success => {
                info!(
                    "Entry {} confirmed in block {}",
                    pending.tx_hash, receipt.block_number
                );
                Ok(pending.entrant)
            }
            TxStatus::Reverted(reason) => {
                warn!("Entry {} reverted: {}", pending.tx_hash, reason);
                Err(DappError::Reverted(pending.tx_hash, reason))
            }
        }
    }
}
