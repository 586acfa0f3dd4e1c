//! Repository traits for record operations.

pub mod contracts;

pub use contracts::ContractRepo;
