// App module - top-level controller tying the modal, session, and record together

mod controller;

pub use controller::*;
