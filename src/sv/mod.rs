pub mod identity;
pub mod record;

pub use identity::Identity;
pub use record::Record;
