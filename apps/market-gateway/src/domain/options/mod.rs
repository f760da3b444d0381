//! Options contracts.
//!
//! - `occ`: OCC identifier decoding and encoding
//! - `contract`: chain snapshots and resolved contracts
//! - `resolver`: nearest-contract resolution for chart clicks

mod contract;
mod occ;
mod resolver;

pub use contract::{
    ApproxContract, ChainQuery, ChainSnapshot, ContractSnapshot, Greeks, OptionType, Resolution,
    ResolvedContract,
};
pub use occ::{OccSymbol, UnparsableIdentifier};
pub use resolver::{ContractResolver, STRIKE_WEIGHT, TIME_SCALE_DAYS};
