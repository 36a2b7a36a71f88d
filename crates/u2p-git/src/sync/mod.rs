//! Mirror synchronization bookkeeping.

mod state;

pub use state::SyncState;
