// threeid - wallet-to-3ID session bootstrap with mergeable profile records
//
// Thin client over two external collaborators reached through trait seams:
// a wallet provider (signer acquisition) and a decentralized identity
// network (session bootstrap and record storage). This crate owns the
// session state machine and the local record cache, nothing else.

pub mod app;
pub mod identity;
pub mod network;
pub mod record;
pub mod wallet;
