pub mod record;
pub mod seed_record;

pub use record::{Batch, Record};
pub use seed_record::{NewSeedRecord, SeedRecord};
