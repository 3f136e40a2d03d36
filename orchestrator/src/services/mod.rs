//! Service implementations
//!
//! In-memory stores standing in for the catalog, ledger and subscription
//! databases, plus the HTTP notification channels and the dispatcher.

pub mod channels;
pub mod clock;
pub mod dispatcher;
pub mod inventory;
pub mod ledger;
pub mod user_directory;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use channels::{DiscordChannel, EmailChannel, RealChannelFactory, SlackChannel, TelegramChannel};
pub use clock::{ManualClock, SystemClock};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use inventory::{ImportSummary, RealInventoryStore};
pub use ledger::RealPromotionLedger;
pub use user_directory::{DirectorySeed, RealUserDirectory};
