//! Component simulator for exercising a running vigil server by hand.
//!
//! - [`client`]: heartbeat HTTP client
//! - [`feeder`]: appends rows to a data file so its mtime keeps moving
//! - [`scenario`]: the heartbeat / file-update loop with crash simulation

pub mod client;
pub mod feeder;
pub mod scenario;
