// Raffle DApp - Participant registry
use crate::address::Address;
use crate::error::DappError;
use crate::provider::WalletProvider;
use log::debug;

/// Display entries the session starts with
pub const PLACEHOLDER_PARTICIPANTS: [&str; 3] = ["0x1234...abcd", "0x5678...efgh", "0x9abc...ijkl"];

/// Session-local list of entrants, most recent first.
///
/// This is a display aid. Nothing here is reconciled with the contract's own
/// player set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantRegistry {
    entries: Vec<String>,
}

impl Default for ParticipantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticipantRegistry {
    /// A registry seeded with the placeholder entries
    pub fn new() -> Self {
        Self::with_entries(PLACEHOLDER_PARTICIPANTS.iter().map(|s| s.to_string()))
    }

    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend an entrant
    pub fn record_entry(&mut self, address: Address) {
        debug!("Participant added: {}", address);
        self.entries.insert(0, address.to_checksum());
    }

    /// Resolve the provider's signer and prepend it
    pub async fn add_current_account<P: WalletProvider>(
        &mut self,
        provider: &P,
    ) -> Result<Address, DappError> {
        let address = provider.signer().await?;
        self.record_entry(address);
        Ok(address)
    }
}
