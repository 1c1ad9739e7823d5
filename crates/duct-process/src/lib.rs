pub mod signal_bridge;
pub mod spawn;

pub use signal_bridge::SignalTarget;
pub use spawn::{open_capture_file, session_id_of, spawn};
