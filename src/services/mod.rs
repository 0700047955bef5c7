pub mod generation;
pub mod notifier;
pub mod relay;
pub mod signature;
pub mod store;
