//! The per-namespace health watching and retaliation control loop
//!
//! - [`NamespaceSupervisor`] follows the namespace lifecycle and owns one monitor per
//!   eligible namespace in its [`NamespaceRegistry`]
//! - [`NamespaceMonitor`] follows the pods of one namespace, keeps its debounced
//!   [`ClusterState`](crate::models::ClusterState) and decides when to retaliate

mod backoff;
mod filter;
mod monitor;
mod registry;
mod status;
mod supervisor;

pub use backoff::Backoff;
pub use filter::NamespaceFilter;
pub use monitor::{MonitorSettings, NamespaceContext, NamespaceMonitor};
pub use registry::{MonitorHandle, NamespaceRegistry};
pub use status::{NamespaceStatus, StatusBoard};
pub use supervisor::NamespaceSupervisor;
