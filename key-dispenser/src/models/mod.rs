pub mod catalog;
pub mod registration;

pub use catalog::{Catalog, CatalogError, Exam, Mode};
pub use registration::{PoolSlot, Registration};
