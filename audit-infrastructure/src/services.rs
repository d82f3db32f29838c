pub mod identity;
pub mod notifier;

pub use identity::*;
pub use notifier::*;
