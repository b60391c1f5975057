// Raffle DApp - Application root
use crate::config::{DappConfig, JoinPolicy};
use crate::contract::RaffleContract;
use crate::error::DappError;
use crate::pagination::PageCursor;
use crate::participants::ParticipantRegistry;
use crate::provider::WalletProvider;
use crate::subscription::Subscription;
use crate::synchronizer::RaffleSynchronizer;
use crate::view::{AppView, InstallPromptView, PageView};
use crate::wallet::WalletAdapter;
use log::{info, warn};
use std::sync::Arc;

/// User interactions the page reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// "Connect your Wallet"
    ConnectWallet,
    /// "Join the Raffle"
    JoinRaffle,
    NextPage,
    PreviousPage,
    /// Re-read the raffle contract
    Refresh,
}

/// Services backing a page with a wallet available
pub struct Session<P> {
    pub wallet: WalletAdapter<P>,
    pub raffle: RaffleSynchronizer<P>,
    pub participants: ParticipantRegistry,
    pub cursor: PageCursor,
    subscriptions: Vec<Subscription>,
}

impl<P: WalletProvider + 'static> Session<P> {
    /// Assemble services around a provider. Listeners start on `mount`.
    pub fn new(provider: Arc<P>, config: &DappConfig) -> Self {
        let contract = RaffleContract::new(Arc::clone(&provider), config.contract_address);
        Self {
            wallet: WalletAdapter::new(provider),
            raffle: RaffleSynchronizer::new(contract),
            participants: ParticipantRegistry::new(),
            cursor: PageCursor::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Listeners currently attached to the session
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.is_active()).count()
    }
}

/// Composition root: owns the services and turns actions into state changes
pub struct RaffleApp<P> {
    config: DappConfig,
    session: Option<Session<P>>,
}

impl<P: WalletProvider + 'static> RaffleApp<P> {
    /// Mount the app. Without a provider only the install prompt is shown.
    pub async fn mount(provider: Option<Arc<P>>, config: DappConfig) -> Self {
        if provider.is_none() {
            warn!("No wallet provider found");
        }
        let session = provider.map(|provider| Session::new(provider, &config));
        Self::mount_session(session, config).await
    }

    /// Mount with pre-built services
    pub async fn mount_session(mut session: Option<Session<P>>, config: DappConfig) -> Self {
        if let Some(session) = session.as_mut() {
            if let Err(err) = session.wallet.load().await {
                warn!("Initial account read failed: {}", err);
            }
            if let Err(err) = session.raffle.refresh().await {
                warn!("Initial raffle read failed: {}", err);
            }

            let account_listener = session.wallet.subscribe();
            let signer_listener = session.raffle.track_signer(session.wallet.watch());
            session.subscriptions = vec![account_listener, signer_listener];
        }
        Self { config, session }
    }

    pub fn config(&self) -> &DappConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session<P>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session<P>> {
        self.session.as_mut()
    }

    /// Tear the page down, releasing its listeners
    pub fn unmount(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.subscriptions.clear();
        }
    }

    pub async fn dispatch(&mut self, action: UiAction) -> Result<(), DappError> {
        let join_policy = self.config.join_policy;
        let session = self.session.as_mut().ok_or(DappError::WalletNotInstalled)?;

        match action {
            UiAction::ConnectWallet => {
                info!("Action: Connect Wallet");
                session.wallet.connect().await?;
                Ok(())
            }
            UiAction::JoinRaffle => {
                info!("Action: Join Raffle");
                Self::process_join(session, join_policy).await
            }
            UiAction::NextPage => {
                let len = session.participants.len();
                session.cursor.next(len);
                Ok(())
            }
            UiAction::PreviousPage => {
                session.cursor.previous();
                Ok(())
            }
            UiAction::Refresh => {
                info!("Action: Refresh");
                session.raffle.refresh().await?;
                Ok(())
            }
        }
    }

    /// Enter the raffle and record the entrant.
    ///
    /// With `JoinPolicy::Confirmed` the list changes only after the entry is
    /// mined successfully, followed by a snapshot refresh. With
    /// `JoinPolicy::Optimistic` the entrant is listed first and the entry is
    /// only submitted.
    async fn process_join(session: &mut Session<P>, policy: JoinPolicy) -> Result<(), DappError> {
        match policy {
            JoinPolicy::Confirmed => {
                let pending = session.raffle.enter_raffle().await?;
                let entrant = session.raffle.confirm(pending).await?;
                session.participants.record_entry(entrant);

                if let Err(err) = session.raffle.refresh().await {
                    warn!("Raffle refresh after entry failed: {}", err);
                }
                Ok(())
            }
            JoinPolicy::Optimistic => {
                let provider = Arc::clone(session.wallet.provider());
                session
                    .participants
                    .add_current_account(provider.as_ref())
                    .await?;
                session.raffle.enter_raffle().await?;
                Ok(())
            }
        }
    }

    /// Current page derived from the services' latest values
    pub fn view(&self) -> AppView {
        match &self.session {
            None => AppView::WalletMissing(InstallPromptView::new()),
            Some(session) => {
                let account = session.wallet.account();
                let snapshot = session.raffle.snapshot();
                AppView::Dapp(PageView::build(
                    account.as_ref(),
                    snapshot.as_ref(),
                    &session.participants,
                    &session.cursor,
                    &self.config,
                ))
            }
        }
    }
}
