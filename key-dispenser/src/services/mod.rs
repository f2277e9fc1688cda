pub mod admin_gate;
pub mod dispenser;
pub mod key_pool;
pub mod metrics;
pub mod store;

pub use admin_gate::AdminGate;
pub use dispenser::{DispenseError, DispenseRequest, Dispenser, SlotRegistrations, NO_KEYS_AVAILABLE};
pub use key_pool::{KeyPool, KeyPoolError};
pub use store::{CsvRegistrationStore, MemoryRegistrationStore, RegistrationStore, StoreError};
