// Kindred Engine: the policy logic layered on top of atoms/.

pub mod config;
pub mod policy;
