//! Common test utilities and fixtures.

pub mod fixtures;
pub mod inference;
pub mod records;
pub mod server;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use inference::*;
#[allow(unused_imports)]
pub use records::*;
#[allow(unused_imports)]
pub use server::*;
