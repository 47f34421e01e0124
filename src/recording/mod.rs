pub mod controller;
#[cfg(test)]
pub(crate) mod testing;

pub use controller::{MediaDevice, RecordingController};
