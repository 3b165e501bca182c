//! Plain data structures exchanged with the management capability.

pub mod deployment;
pub mod generic_resource;
pub mod resource_group;

pub use deployment::*;
pub use generic_resource::*;
pub use resource_group::*;
