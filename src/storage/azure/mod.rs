pub mod client;
pub mod objects;
pub mod provider;
pub mod signer;

pub use provider::AzureBlobStorage;
