//! kubecd Core - value trees and the environment/release model
//!
//! This crate provides the foundational types used throughout kubecd:
//! - `ValueTree`: Nested configuration values with deep merge and dotted-path access
//! - `Environment` / `Release`: Deployment targets and what gets deployed into them
//! - `ChartValue` / `ValueFrom`: Value entries, literal or backed by an external source

pub mod error;
pub mod model;
pub mod values;

pub use error::{CoreError, Result};
pub use model::{
    Chart, ChartSource, ChartValue, Cluster, Environment, GceAddressRef, GceResource, GkeProvider,
    HelmRepo, Provider, Release, ValueFrom,
};
pub use values::{ValueNode, ValueTree, expand, merge};
