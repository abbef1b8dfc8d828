// Wallet module - signer acquisition through a modal selection flow

mod address;
mod capability;
mod modal;
mod provider;

pub use address::*;
pub use capability::*;
pub use modal::*;
pub use provider::*;
