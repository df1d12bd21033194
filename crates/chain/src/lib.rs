pub mod genesis;
pub mod types;
