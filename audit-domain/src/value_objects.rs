// Domain value objects
pub mod subject;
pub mod transfer_type;

pub use subject::*;
pub use transfer_type::*;
