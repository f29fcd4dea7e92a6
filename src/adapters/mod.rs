// Adapters layer: concrete membership stores behind the `MembershipStore` port.

pub mod dry_run;
pub mod http_store;
pub mod memory_store;

pub use dry_run::DryRunStore;
pub use http_store::HttpMembershipStore;
pub use memory_store::InMemoryMembershipStore;
