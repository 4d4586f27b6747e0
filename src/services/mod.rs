pub mod provisioning;
pub mod seed;

pub use provisioning::{provision, ProvisionError};
pub use seed::{seed_default_categories, seed_demo, seed_demo_accounts, seed_demo_content, DemoSeed, SeedError};
