pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{SIGNING_SECRET, sample_contract, signed_query, store_in};
