pub mod alias;
pub mod record;

pub use record::Tier;
