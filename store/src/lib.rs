//! LedgerLock Store
//!
//! The ledger store contract consumed by the transaction coordinator, plus
//! an in-memory implementation backing tests and the simulator. The store is
//! an external collaborator in production; only its interface is fixed here.

pub mod account;
pub mod memory;
pub mod store;

pub use account::Account;
pub use memory::MemoryStore;
pub use store::LedgerStore;
