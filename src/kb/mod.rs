pub mod code_sync;

pub use code_sync::CodeSync;
