// Network module - client seam for the decentralized identity network

mod client;
mod mock;

pub use client::*;
pub use mock::*;
