// Identity module - 3ID session bootstrap against the identity network

mod bootstrap;
mod credential;
mod session;
mod three_id;

pub use bootstrap::*;
pub use credential::*;
pub use session::*;
pub use three_id::*;
