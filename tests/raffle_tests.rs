use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use raffle_dapp::{
    address::Address,
    app::{RaffleApp, UiAction},
    config::{DappConfig, JoinPolicy},
    contract::RaffleContract,
    devnet::{LocalDevnet, GENESIS_TIMESTAMP},
    error::{ContractError, DappError},
    provider::WalletProvider,
    state::RaffleState,
    synchronizer::RaffleSynchronizer,
    utils::parse_ether,
    view::{AppView, OPEN_MESSAGE},
    wallet::WalletAdapter,
};

const WAIT: Duration = Duration::from_secs(2);

// Setup a devnet with two funded wallet accounts and a deployed raffle
async fn setup() -> (Arc<LocalDevnet>, Address, Address, Address) {
    let devnet = Arc::new(LocalDevnet::new());
    let alice = devnet.add_account(parse_ether("1.5").unwrap()).unwrap();
    let bob = devnet.add_account(parse_ether("2").unwrap()).unwrap();
    let raffle = devnet.deploy_raffle(parse_ether("0.01").unwrap()).unwrap();
    (devnet, alice, bob, raffle)
}

fn synchronizer(devnet: &Arc<LocalDevnet>, raffle: Address) -> RaffleSynchronizer<LocalDevnet> {
    RaffleSynchronizer::new(RaffleContract::new(Arc::clone(devnet), raffle))
}

async fn mount(devnet: &Arc<LocalDevnet>, config: DappConfig) -> RaffleApp<LocalDevnet> {
    RaffleApp::mount(Some(Arc::clone(devnet)), config).await
}

fn participants(app: &RaffleApp<LocalDevnet>) -> Vec<String> {
    app.session().unwrap().participants.list().to_vec()
}

// Test reading a fresh raffle
#[tokio::test]
async fn test_refresh_reads_snapshot() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    let sync = synchronizer(&devnet, raffle);
    assert!(sync.snapshot().is_none());

    let snapshot = sync.refresh().await.unwrap().unwrap();

    assert_eq!(snapshot.state, RaffleState::Open);
    assert!(snapshot.is_open());
    assert_eq!(snapshot.entrance_fee, 10_000_000_000_000_000);
    assert_eq!(snapshot.entrance_fee_display(), "0.01");
    assert_eq!(snapshot.prize_pool, 0);
    assert_eq!(snapshot.prize_pool_display(), "0.0");
    assert_eq!(snapshot.last_winner, Address::ZERO);
    assert_eq!(snapshot.last_draw, GENESIS_TIMESTAMP);
    assert_eq!(snapshot.last_draw_display(), "11/14/2023, 10:13:20 PM");
    assert_eq!(sync.snapshot(), Some(snapshot));
}

// Test that a read against a missing contract publishes nothing
#[tokio::test]
async fn test_refresh_failure_keeps_previous_snapshot() {
    let (devnet, _alice, _bob, _raffle) = setup().await;
    let missing = Address::derive(b"nothing here");
    let sync = synchronizer(&devnet, missing);

    let result = sync.refresh().await;

    assert_eq!(result, Err(DappError::NoContract(missing)));
    assert!(sync.snapshot().is_none());
}

// Test that a refresh overtaken by a newer one is dropped
#[tokio::test]
async fn test_stale_refresh_is_discarded() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    devnet.set_latency(Some(Duration::from_millis(20))).unwrap();
    let sync = synchronizer(&devnet, raffle);

    let (first, second) = tokio::join!(sync.refresh(), sync.refresh());

    assert_eq!(first, Ok(None));
    let second = second.unwrap().unwrap();
    assert_eq!(sync.snapshot(), Some(second));
}

// Test entering without a connected signer
#[tokio::test]
async fn test_enter_raffle_without_signer_fails() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    let sync = synchronizer(&devnet, raffle);

    let result = sync.enter_raffle().await;

    assert_eq!(result, Err(DappError::NoSigner));
    assert!(devnet.storage(raffle).unwrap().players.is_empty());
}

// Test submitting and confirming an entry
#[tokio::test]
async fn test_enter_raffle_sends_entrance_fee() {
    let (devnet, alice, _bob, raffle) = setup().await;
    devnet.request_accounts().await.unwrap();
    let sync = synchronizer(&devnet, raffle);
    sync.refresh().await.unwrap();

    let pending = sync.enter_raffle().await.unwrap();
    assert_eq!(pending.entrant, alice);
    assert_eq!(pending.value, parse_ether("0.01").unwrap());

    // Submission alone leaves the snapshot untouched
    assert_eq!(sync.snapshot().unwrap().prize_pool, 0);

    let entrant = sync.confirm(pending).await.unwrap();
    assert_eq!(entrant, alice);
    assert_eq!(devnet.storage(raffle).unwrap().players, vec![alice.to_bytes()]);
    assert_eq!(
        devnet.balance(alice).await.unwrap(),
        parse_ether("1.49").unwrap()
    );
    assert_eq!(devnet.balance(raffle).await.unwrap(), parse_ether("0.01").unwrap());
}

// Test that an entry into a closed raffle reverts on confirmation
#[tokio::test]
async fn test_confirm_reports_revert() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    devnet.request_accounts().await.unwrap();
    devnet.set_raffle_state(raffle, RaffleState::Calculating).unwrap();
    let sync = synchronizer(&devnet, raffle);

    let pending = sync.enter_raffle().await.unwrap();
    let result = sync.confirm(pending).await;

    assert_eq!(
        result,
        Err(DappError::Reverted(pending.tx_hash, ContractError::RaffleNotOpen))
    );
    assert_eq!(devnet.balance(raffle).await.unwrap(), 0);
}

// Test a declined connection prompt
#[tokio::test]
async fn test_connect_rejected_by_user() {
    let (devnet, _alice, _bob, _raffle) = setup().await;
    devnet.reject_requests(true).unwrap();
    let wallet = WalletAdapter::new(Arc::clone(&devnet));

    assert_eq!(wallet.connect().await, Err(DappError::UserRejected));
    assert!(wallet.account().is_none());
}

// Test connecting the wallet
#[tokio::test]
async fn test_connect_sets_account_and_balance() {
    let (devnet, alice, _bob, _raffle) = setup().await;
    let wallet = WalletAdapter::new(Arc::clone(&devnet));
    assert_eq!(wallet.load().await.unwrap(), None);

    assert_eq!(wallet.connect().await.unwrap(), alice);

    let account = wallet.account().unwrap();
    assert_eq!(account.address, alice);
    assert_eq!(account.balance_display(), "1.5");
}

// Test that a failed balance read on connect publishes no account
#[tokio::test]
async fn test_connect_with_failed_balance_publishes_nothing() {
    let (devnet, alice, _bob, _raffle) = setup().await;
    devnet.fail_balance_reads(true).unwrap();
    let wallet = WalletAdapter::new(Arc::clone(&devnet));

    assert_eq!(wallet.connect().await.unwrap(), alice);
    assert!(wallet.account().is_none());

    devnet.fail_balance_reads(false).unwrap();
    wallet.connect().await.unwrap();
    assert_eq!(wallet.account().unwrap().balance, parse_ether("1.5").unwrap());
}

// Test that an account switch re-derives the account
#[tokio::test]
async fn test_account_change_updates_wallet() {
    let (devnet, _alice, bob, _raffle) = setup().await;
    let wallet = WalletAdapter::new(Arc::clone(&devnet));
    wallet.connect().await.unwrap();
    let _subscription = wallet.subscribe();
    let mut accounts = wallet.watch();

    devnet.select_account(bob).unwrap();

    timeout(
        WAIT,
        accounts.wait_for(|account| account.map_or(false, |a| a.address == bob)),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(wallet.account().unwrap().balance, parse_ether("2").unwrap());
}

// Test that a failed balance read leaves the previous account in place
#[tokio::test]
async fn test_account_change_with_failed_balance_keeps_prior_state() {
    let (devnet, alice, bob, _raffle) = setup().await;
    let wallet = WalletAdapter::new(Arc::clone(&devnet));
    wallet.connect().await.unwrap();
    let _subscription = wallet.subscribe();

    devnet.fail_balance_reads(true).unwrap();
    devnet.select_account(bob).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(wallet.account().unwrap().address, alice);

    devnet.fail_balance_reads(false).unwrap();
    devnet.select_account(bob).unwrap();
    let mut accounts = wallet.watch();
    timeout(
        WAIT,
        accounts.wait_for(|account| account.map_or(false, |a| a.address == bob)),
    )
    .await
    .unwrap()
    .unwrap();
}

// Test disconnecting from the wallet side
#[tokio::test]
async fn test_disconnect_clears_account() {
    let (devnet, _alice, _bob, _raffle) = setup().await;
    let wallet = WalletAdapter::new(Arc::clone(&devnet));
    wallet.connect().await.unwrap();
    let _subscription = wallet.subscribe();
    let mut accounts = wallet.watch();

    devnet.disconnect().unwrap();

    timeout(WAIT, accounts.wait_for(|account| account.is_none()))
        .await
        .unwrap()
        .unwrap();
}

// Test that dropping the guard stops listening
#[tokio::test]
async fn test_subscription_released_on_drop() {
    let (devnet, _alice, _bob, _raffle) = setup().await;
    let wallet = WalletAdapter::new(Arc::clone(&devnet));

    let subscription = wallet.subscribe();
    assert!(subscription.is_active());
    assert_eq!(devnet.listener_count(), 1);

    drop(subscription);
    timeout(WAIT, async {
        while devnet.listener_count() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}

// Test mounting picks up an authorised account and the raffle state
#[tokio::test]
async fn test_mount_loads_account_and_snapshot() {
    let (devnet, alice, _bob, raffle) = setup().await;
    devnet.request_accounts().await.unwrap();

    let app = mount(&devnet, DappConfig::new(raffle)).await;

    let session = app.session().unwrap();
    assert_eq!(session.wallet.account().unwrap().address, alice);
    assert!(session.raffle.snapshot().unwrap().is_open());
    assert_eq!(session.active_subscriptions(), 2);
    assert_eq!(participants(&app).len(), 3);
}

// Test that a signer change triggers a new snapshot
#[tokio::test]
async fn test_signer_change_refreshes_snapshot() {
    let (devnet, _alice, bob, raffle) = setup().await;
    devnet.request_accounts().await.unwrap();
    let app = mount(&devnet, DappConfig::new(raffle)).await;
    let session = app.session().unwrap();

    devnet.set_raffle_state(raffle, RaffleState::Calculating).unwrap();
    assert!(session.raffle.snapshot().unwrap().is_open());

    let mut snapshots = session.raffle.watch();
    devnet.select_account(bob).unwrap();

    timeout(
        WAIT,
        snapshots.wait_for(|snapshot| snapshot.map_or(false, |s| !s.is_open())),
    )
    .await
    .unwrap()
    .unwrap();
}

// Test joining through the page
#[tokio::test]
async fn test_join_adds_entrant_after_confirmation() {
    let (devnet, alice, _bob, raffle) = setup().await;
    let mut app = mount(&devnet, DappConfig::new(raffle)).await;

    app.dispatch(UiAction::ConnectWallet).await.unwrap();
    app.dispatch(UiAction::JoinRaffle).await.unwrap();

    let list = participants(&app);
    assert_eq!(list.len(), 4);
    assert_eq!(list[0], alice.to_checksum());
    assert_eq!(list[1..], ["0x1234...abcd", "0x5678...efgh", "0x9abc...ijkl"]);

    let snapshot = app.session().unwrap().raffle.snapshot().unwrap();
    assert_eq!(snapshot.prize_pool_display(), "0.01");
}

// Test a confirmed entrant shows up on the open raffle page
#[tokio::test]
async fn test_open_page_lists_confirmed_entrant() {
    let (devnet, alice, _bob, raffle) = setup().await;
    let mut app = mount(&devnet, DappConfig::new(raffle)).await;

    app.dispatch(UiAction::ConnectWallet).await.unwrap();
    app.dispatch(UiAction::JoinRaffle).await.unwrap();

    let page = match app.view() {
        AppView::Dapp(page) => page,
        AppView::WalletMissing(_) => panic!("wallet is installed"),
    };
    assert_eq!(page.status.status, OPEN_MESSAGE);
    let participants = page.participants.unwrap();
    assert_eq!(participants.entries[0].text, alice.to_checksum());
    assert_eq!(participants.entries.len(), 4);

    devnet.set_raffle_state(raffle, RaffleState::Calculating).unwrap();
    app.dispatch(UiAction::Refresh).await.unwrap();
    match app.view() {
        AppView::Dapp(page) => assert!(page.participants.is_none()),
        AppView::WalletMissing(_) => panic!("wallet is installed"),
    }
}

// Test that joining without a wallet fails and the page survives
#[tokio::test]
async fn test_join_without_wallet_fails_gracefully() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    let mut app = mount(&devnet, DappConfig::new(raffle)).await;

    let result = app.dispatch(UiAction::JoinRaffle).await;

    assert_eq!(result, Err(DappError::NoSigner));
    assert_eq!(participants(&app).len(), 3);
    match app.view() {
        AppView::Dapp(page) => assert!(page.account.is_none()),
        AppView::WalletMissing(_) => panic!("wallet is installed"),
    }
}

// Test that a reverted entry leaves the list alone
#[tokio::test]
async fn test_reverted_join_leaves_list_unchanged() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    devnet.set_raffle_state(raffle, RaffleState::Calculating).unwrap();
    let mut app = mount(&devnet, DappConfig::new(raffle)).await;
    app.dispatch(UiAction::ConnectWallet).await.unwrap();

    let result = app.dispatch(UiAction::JoinRaffle).await;

    assert!(matches!(
        result,
        Err(DappError::Reverted(_, ContractError::RaffleNotOpen))
    ));
    assert_eq!(participants(&app).len(), 3);
}

// Test the optimistic policy lists the entrant whatever the outcome
#[tokio::test]
async fn test_optimistic_join_lists_entrant_before_outcome() {
    let (devnet, alice, _bob, raffle) = setup().await;
    devnet.set_raffle_state(raffle, RaffleState::Calculating).unwrap();
    let mut config = DappConfig::new(raffle);
    config.join_policy = JoinPolicy::Optimistic;
    let mut app = mount(&devnet, config).await;
    app.dispatch(UiAction::ConnectWallet).await.unwrap();

    app.dispatch(UiAction::JoinRaffle).await.unwrap();

    let list = participants(&app);
    assert_eq!(list.len(), 4);
    assert_eq!(list[0], alice.to_checksum());
    assert!(devnet.storage(raffle).unwrap().players.is_empty());
}

// Test a full round: two entries, a draw and a refresh
#[tokio::test]
async fn test_draw_pays_winner_and_updates_snapshot() {
    let (devnet, alice, bob, raffle) = setup().await;
    let mut app = mount(&devnet, DappConfig::new(raffle)).await;

    app.dispatch(UiAction::ConnectWallet).await.unwrap();
    app.dispatch(UiAction::JoinRaffle).await.unwrap();
    devnet.select_account(bob).unwrap();
    app.dispatch(UiAction::JoinRaffle).await.unwrap();
    assert_eq!(
        devnet.balance(raffle).await.unwrap(),
        parse_ether("0.02").unwrap()
    );

    devnet.advance_time(3600).unwrap();
    let winner = devnet.draw_winner(raffle).unwrap();
    assert!(winner == alice || winner == bob);
    app.dispatch(UiAction::Refresh).await.unwrap();

    let snapshot = app.session().unwrap().raffle.snapshot().unwrap();
    assert_eq!(snapshot.last_winner, winner);
    assert_eq!(snapshot.prize_pool, 0);
    assert_eq!(snapshot.last_draw, GENESIS_TIMESTAMP + 3600);
    assert!(devnet.storage(raffle).unwrap().players.is_empty());
    assert_eq!(devnet.draw_winner(raffle), Err(DappError::Contract(ContractError::NoPlayers)));
}

// Test paging through the participant list
#[tokio::test]
async fn test_page_actions_move_cursor() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    let mut app = mount(&devnet, DappConfig::new(raffle)).await;
    {
        let session = app.session_mut().unwrap();
        for i in 0..9u8 {
            session.participants.record_entry(Address::new_from_array([i + 1; 20]));
        }
    }

    app.dispatch(UiAction::NextPage).await.unwrap();
    app.dispatch(UiAction::NextPage).await.unwrap();
    assert_eq!(app.session().unwrap().cursor.page(), 3);

    // 12 entries make three pages; there is no fourth
    app.dispatch(UiAction::NextPage).await.unwrap();
    assert_eq!(app.session().unwrap().cursor.page(), 3);

    app.dispatch(UiAction::PreviousPage).await.unwrap();
    assert_eq!(app.session().unwrap().cursor.page(), 2);
}

// Test the page shown when no wallet is installed
#[tokio::test]
async fn test_mount_without_wallet_shows_install_prompt() {
    let (_devnet, _alice, _bob, raffle) = setup().await;
    let mut app = RaffleApp::<LocalDevnet>::mount(None, DappConfig::new(raffle)).await;

    match app.view() {
        AppView::WalletMissing(prompt) => {
            assert_eq!(prompt.title, "MetaMask Not Installed");
            assert_eq!(prompt.link.href, "https://metamask.io/download.html");
        }
        AppView::Dapp(_) => panic!("no wallet should be available"),
    }
    assert_eq!(
        app.dispatch(UiAction::ConnectWallet).await,
        Err(DappError::WalletNotInstalled)
    );
}

// Test unmounting releases the listeners
#[tokio::test]
async fn test_unmount_releases_subscriptions() {
    let (devnet, _alice, _bob, raffle) = setup().await;
    let mut app = mount(&devnet, DappConfig::new(raffle)).await;
    assert_eq!(devnet.listener_count(), 1);

    app.unmount();

    assert_eq!(app.session().unwrap().active_subscriptions(), 0);
    timeout(WAIT, async {
        while devnet.listener_count() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}
