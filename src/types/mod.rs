//! Descriptor and batch types

pub mod batch;
pub mod descriptor;

pub use batch::{RunContext, TxBatch};
pub use descriptor::{
    ArgRefresher, Call, Delegation, FunctionId, Refreshed, SignerRole, TxDescriptor,
};
