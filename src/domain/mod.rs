//! Domain Layer - Core types and state for the boost tracker
//!
//! Pure in-memory state plus snapshot persistence. External data arrives
//! through the ports layer.
//!
//! - `token`: feed entries, valuations, tracked records
//! - `ledger`: address -> record map with a size ceiling
//! - `exclusion`: permanent market cap ceiling tombstones
//! - `snapshot`: numbered JSON dumps of the ledger
//! - `format`: log line helpers

pub mod token;
pub mod ledger;
pub mod exclusion;
pub mod snapshot;
pub mod format;

pub use token::{BoostedToken, HistoryEntry, HolderConcentration, PricePoint, TokenRecord, Valuation};
pub use ledger::{LedgerError, TokenLedger, DEFAULT_LEDGER_CAPACITY};
pub use exclusion::{ExclusionSet, DEFAULT_MARKET_CAP_CEILING};
pub use snapshot::{latest_snapshot, load_snapshot, SnapshotError, SnapshotWriter};
pub use format::{elapsed_string, shorten_number};
