// Raffle DApp - Wallet connection adapter
use crate::address::Address;
use crate::error::DappError;
use crate::provider::WalletProvider;
use crate::state::Account;
use crate::subscription::Subscription;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Tracks the connected account and its balance for a single wallet provider
pub struct WalletAdapter<P> {
    provider: Arc<P>,
    account: Arc<watch::Sender<Option<Account>>>,
}

impl<P: WalletProvider + 'static> WalletAdapter<P> {
    pub fn new(provider: Arc<P>) -> Self {
        let (account, _) = watch::channel(None);
        Self {
            provider,
            account: Arc::new(account),
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// The current account, or `None` if the wallet was never connected
    pub fn account(&self) -> Option<Account> {
        *self.account.borrow()
    }

    /// Receiver notified on every account update
    pub fn watch(&self) -> watch::Receiver<Option<Account>> {
        self.account.subscribe()
    }

    /// Pick up an already-authorised account without prompting the user
    pub async fn load(&self) -> Result<Option<Account>, DappError> {
        let accounts = self.provider.accounts().await?;
        match accounts.first() {
            Some(address) => {
                let balance = self.provider.balance(*address).await?;
                let account = Account {
                    address: *address,
                    balance,
                };
                self.account.send_replace(Some(account));
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Prompt the wallet for access and adopt the first granted account.
    ///
    /// A failed balance read still returns the granted address but leaves the
    /// published account as it was.
    pub async fn connect(&self) -> Result<Address, DappError> {
        let accounts = self.provider.request_accounts().await?;
        let address = *accounts.first().ok_or(DappError::NoSigner)?;
        info!("Wallet connected: {}", address);

        // The account is only published once its balance is known
        refresh_balance(self.provider.as_ref(), &self.account, address).await;

        Ok(address)
    }

    /// Listen for account changes until the returned guard is dropped
    pub fn subscribe(&self) -> Subscription {
        let mut notifications = self.provider.subscribe_accounts();
        let provider = Arc::clone(&self.provider);
        let account = Arc::clone(&self.account);

        Subscription::spawn(async move {
            loop {
                let accounts = match notifications.recv().await {
                    Ok(accounts) => accounts,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Skipped {} stale account notifications", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                match accounts.first() {
                    Some(address) => {
                        info!("Account changed: {}", address);
                        refresh_balance(provider.as_ref(), &account, *address).await;
                    }
                    None => {
                        info!("Wallet disconnected");
                        account.send_replace(None);
                    }
                }
            }
        })
    }
}

// Best effort: on a failed read the previous account stays published.
async fn refresh_balance<P: WalletProvider>(
    provider: &P,
    account: &watch::Sender<Option<Account>>,
    address: Address,
) {
    match provider.balance(address).await {
        Ok(balance) => {
            account.send_replace(Some(Account { address, balance }));
        }
        Err(err) => warn!("Balance read for {} failed: {}", address, err),
    }
}
