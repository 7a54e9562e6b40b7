//! Contract bindings for the Learna protocol

pub mod erc20;
pub mod learna;

pub use erc20::*;
pub use learna::*;
