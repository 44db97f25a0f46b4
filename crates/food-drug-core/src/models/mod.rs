//! Domain models for the food-drug interaction core.

mod catalog;
mod instructions;
mod interaction;
mod medication;
mod role;

pub use catalog::*;
pub use instructions::*;
pub use interaction::*;
pub use medication::*;
pub use role::*;
