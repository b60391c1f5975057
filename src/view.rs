// Raffle DApp - Presentation
//
// View models are plain data derived from the services' current values, so
// they can be asserted on directly. `Display` renders them as a text page.
use crate::config::{DappConfig, WALLET_INSTALL_URL};
use crate::pagination::PageCursor;
use crate::participants::ParticipantRegistry;
use crate::state::{Account, RaffleSnapshot};
use crate::utils::{abbreviate_address, explorer_url, NATIVE_SYMBOL};
use std::fmt;

pub const WELCOME_TITLE: &str = "Welcome to the Raffle DApp";
pub const WELCOME_TAGLINE: &str = "Join the raffle to win exciting prizes! Remember, the more you participate, the higher your chances of winning!";
pub const OPEN_MESSAGE: &str = "The raffle is currently open! 🎉";
pub const CLOSED_MESSAGE: &str = "The raffle is closed.";
pub const NO_WALLET_MESSAGE: &str = "No wallet connected";
pub const CONNECT_LABEL: &str = "Connect your Wallet";
pub const JOIN_LABEL: &str = "Join the Raffle";

// Shown in place of snapshot values before the first read lands
const PENDING: &str = "...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkView {
    pub text: String,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountView {
    pub address: String,
    /// e.g. `1.5 ETH`
    pub balance: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusView {
    pub status: String,
    pub last_winner: Option<LinkView>,
    pub last_draw: String,
    /// e.g. `0.03 ETH`
    pub prize: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlsView {
    /// e.g. `Entrance is 0.01 ETH`
    pub entrance: String,
    pub connect: ButtonView,
    pub join: ButtonView,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantsView {
    pub entries: Vec<LinkView>,
    pub page: usize,
    pub total_pages: usize,
    pub previous: ButtonView,
    pub next: ButtonView,
}

/// The connected page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    pub account: Option<AccountView>,
    pub status: StatusView,
    pub controls: ControlsView,
    /// Only present while the raffle is open
    pub participants: Option<ParticipantsView>,
}

/// Shown instead of the page when no wallet is installed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallPromptView {
    pub title: &'static str,
    pub message: &'static str,
    pub link: LinkView,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppView {
    WalletMissing(InstallPromptView),
    Dapp(PageView),
}

impl InstallPromptView {
    pub fn new() -> Self {
        Self {
            title: "MetaMask Not Installed",
            message: "It seems that you do not have MetaMask installed. Please install MetaMask to participate in the raffle.",
            link: LinkView {
                text: "Install MetaMask".to_string(),
                href: WALLET_INSTALL_URL.to_string(),
            },
        }
    }
}

impl Default for InstallPromptView {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountView {
    pub fn build(account: &Account) -> Self {
        Self {
            address: account.address.to_checksum(),
            balance: format!("{} {}", account.balance_display(), NATIVE_SYMBOL),
        }
    }
}

impl StatusView {
    pub fn build(snapshot: Option<&RaffleSnapshot>, config: &DappConfig) -> Self {
        match snapshot {
            Some(snapshot) => {
                let winner = snapshot.last_winner_display();
                Self {
                    status: if snapshot.is_open() {
                        OPEN_MESSAGE.to_string()
                    } else {
                        CLOSED_MESSAGE.to_string()
                    },
                    last_winner: Some(LinkView {
                        text: abbreviate_address(&winner),
                        href: explorer_url(&config.explorer_url, &winner),
                    }),
                    last_draw: snapshot.last_draw_display(),
                    prize: format!("{} {}", snapshot.prize_pool_display(), NATIVE_SYMBOL),
                }
            }
            None => Self {
                status: PENDING.to_string(),
                last_winner: None,
                last_draw: PENDING.to_string(),
                prize: format!("{} {}", PENDING, NATIVE_SYMBOL),
            },
        }
    }
}

impl ControlsView {
    pub fn build(snapshot: Option<&RaffleSnapshot>) -> Self {
        let fee = snapshot.map_or_else(|| PENDING.to_string(), |s| s.entrance_fee_display());
        Self {
            entrance: format!("Entrance is {} {}", fee, NATIVE_SYMBOL),
            connect: ButtonView {
                label: CONNECT_LABEL,
                enabled: true,
            },
            join: ButtonView {
                label: JOIN_LABEL,
                enabled: true,
            },
        }
    }
}

impl ParticipantsView {
    pub fn build(participants: &ParticipantRegistry, cursor: &PageCursor, config: &DappConfig) -> Self {
        let list = participants.list();
        Self {
            entries: cursor
                .slice(list)
                .iter()
                .map(|address| LinkView {
                    text: address.clone(),
                    href: explorer_url(&config.explorer_url, address),
                })
                .collect(),
            page: cursor.page(),
            total_pages: cursor.total_pages(list.len()),
            previous: ButtonView {
                label: "Previous",
                enabled: cursor.has_previous(),
            },
            next: ButtonView {
                label: "Next",
                enabled: cursor.has_next(list.len()),
            },
        }
    }
}

impl PageView {
    pub fn build(
        account: Option<&Account>,
        snapshot: Option<&RaffleSnapshot>,
        participants: &ParticipantRegistry,
        cursor: &PageCursor,
        config: &DappConfig,
    ) -> Self {
        // The list accompanies the open card; before the first read it is shown too
        let show_participants = snapshot.map_or(true, |s| s.is_open());

        Self {
            account: account.map(AccountView::build),
            status: StatusView::build(snapshot, config),
            controls: ControlsView::build(snapshot),
            participants: show_participants
                .then(|| ParticipantsView::build(participants, cursor, config)),
        }
    }
}

impl fmt::Display for LinkView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.text, self.href)
    }
}

impl fmt::Display for ButtonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "[ {} ]", self.label)
        } else {
            write!(f, "[ {} (disabled) ]", self.label)
        }
    }
}

impl fmt::Display for InstallPromptView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.message)?;
        writeln!(f, "{}", self.link)
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.account {
            Some(account) => {
                writeln!(f, "Connected Address: {}", account.address)?;
                writeln!(f, "Address Balance: {}", account.balance)?;
            }
            None => writeln!(f, "{}", NO_WALLET_MESSAGE)?,
        }
        writeln!(f)?;

        writeln!(f, "Raffle Status: {}", self.status.status)?;
        match &self.status.last_winner {
            Some(link) => writeln!(f, "Last Winner: {}", link)?,
            None => writeln!(f, "Last Winner: {}", PENDING)?,
        }
        writeln!(f, "Last Raffle Date: {}", self.status.last_draw)?;
        writeln!(f, "Prize Won: {}", self.status.prize)?;
        writeln!(f)?;

        writeln!(f, "Entrance ({})", NATIVE_SYMBOL)?;
        writeln!(f, "{}", self.controls.entrance)?;
        writeln!(f, "{}  {}", self.controls.connect, self.controls.join)?;

        if let Some(participants) = &self.participants {
            writeln!(f)?;
            writeln!(
                f,
                "Participants (page {} of {})",
                participants.page, participants.total_pages
            )?;
            for entry in &participants.entries {
                writeln!(f, "  {}", entry)?;
            }
            writeln!(f, "{}  {}", participants.previous, participants.next)?;
        }
        Ok(())
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", WELCOME_TITLE)?;
        writeln!(f, "{}", WELCOME_TAGLINE)?;
        writeln!(f)?;
        match self {
            AppView::WalletMissing(prompt) => write!(f, "{}", prompt),
            AppView::Dapp(page) => write!(f, "{}", page),
        }
    }
}
