mod adapters;
pub mod factory;

pub use adapters::{RawOutput, ScriptRunner, SharedRunner};
pub use factory::default_runner;

#[cfg(test)]
pub use adapters::fake::FakeHost;
