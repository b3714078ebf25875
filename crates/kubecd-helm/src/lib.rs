//! kubecd Helm values resolution
//!
//! This crate computes the values handed to helm for a release deployed into
//! an environment:
//!
//! - **Value-from resolution**: entries backed by an external source (e.g. a
//!   reserved GCE address) are looked up through an injected [`Runner`]
//! - **Inspect cache**: default values of remote charts are fetched once per
//!   (reference, version) and kept on disk
//! - **Pipeline**: chart defaults, environment defaults, release values file
//!   and inline values are deep-merged in that order
//! - **Helm argv**: `helm upgrade` / `helm diff` / `kubectl apply` command lines
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kubecd_core::Environment;
//! use kubecd_helm::{InspectCache, ProcessRunner, ValuesPipeline};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = Environment::load("environments/prod.yaml")?;
//! let pipeline = ValuesPipeline::new(Arc::new(ProcessRunner), InspectCache::default_dir()?);
//!
//! let release = env.get_release("frontend").ok_or("no such release")?;
//! let values = pipeline.resolve_values(release, &env, false)?;
//! println!("{:?}", values.lookup("ingress.host"));
//! # Ok(())
//! # }
//! ```

pub mod argv;
pub mod cache;
pub mod error;
pub mod resolve;
pub mod runner;
pub mod values;

// Re-exports for convenience
pub use argv::{HelmArgv, kube_context_name, repo_setup_commands};
pub use cache::{CACHE_ENV_VAR, InspectCache};
pub use error::{CommandError, HelmError, Result};
pub use resolve::{ExternalSource, ValueResolver, zone_to_region};
pub use runner::{MockRunner, ProcessRunner, Runner};
pub use values::ValuesPipeline;
