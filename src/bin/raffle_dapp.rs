// Raffle DApp - local demo
//
// Deploys a raffle on the in-memory devnet, mounts the app against it and
// walks through a connect / join / draw session, printing the page after each
// step. Set RUST_LOG=debug to see the provider traffic.
use anyhow::Context;
use log::{error, info};
use raffle_dapp::devnet::LocalDevnet;
use raffle_dapp::utils::parse_ether;
use raffle_dapp::{DappConfig, RaffleApp, RaffleState, UiAction};
use std::sync::Arc;

const ENTRANCE_FEE_KEY: &str = "RAFFLE_ENTRANCE_FEE";
const DEFAULT_ENTRANCE_FEE: &str = "0.01";

fn print_page(app: &RaffleApp<LocalDevnet>, step: &str) {
    println!("==== {} ====", step);
    println!("{}", app.view());
}

async fn dispatch(app: &mut RaffleApp<LocalDevnet>, action: UiAction) {
    // Failures are logged and the page keeps rendering
    if let Err(err) = app.dispatch(action).await {
        error!("{:?} failed: {}", action, err);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let fee_input = std::env::var(ENTRANCE_FEE_KEY).unwrap_or_else(|_| DEFAULT_ENTRANCE_FEE.to_string());
    let entrance_fee = parse_ether(&fee_input).context("parsing RAFFLE_ENTRANCE_FEE")?;

    let devnet = Arc::new(LocalDevnet::new());
    let alice = devnet.add_account(parse_ether("1.5")?)?;
    let bob = devnet.add_account(parse_ether("2")?)?;
    let raffle = devnet.deploy_raffle(entrance_fee)?;
    info!("Wallet accounts: {} {}", alice, bob);

    let config = DappConfig::from_env(Some(raffle))?;
    let mut app = RaffleApp::mount(Some(Arc::clone(&devnet)), config).await;
    print_page(&app, "mounted");

    // Joining before connecting fails without taking the page down
    dispatch(&mut app, UiAction::JoinRaffle).await;

    dispatch(&mut app, UiAction::ConnectWallet).await;
    dispatch(&mut app, UiAction::JoinRaffle).await;
    print_page(&app, "alice joined");

    devnet.select_account(bob)?;
    tokio::task::yield_now().await;
    dispatch(&mut app, UiAction::JoinRaffle).await;
    print_page(&app, "bob joined");

    dispatch(&mut app, UiAction::NextPage).await;

    // Entries close while the draw is pending, which hides the participant list
    devnet.set_raffle_state(raffle, RaffleState::Calculating)?;
    dispatch(&mut app, UiAction::Refresh).await;
    print_page(&app, "drawing");

    devnet.advance_time(3600)?;
    let winner = devnet.draw_winner(raffle)?;
    info!("Winner drawn: {}", winner);
    dispatch(&mut app, UiAction::Refresh).await;
    print_page(&app, "after draw");

    app.unmount();

    let without_wallet = RaffleApp::<LocalDevnet>::mount(None, DappConfig::new(raffle)).await;
    print_page(&without_wallet, "no wallet installed");
    Ok(())
}
