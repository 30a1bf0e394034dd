//! Retaliation: deleting one stuck pod so its controller recreates it
//!
//! The decision is pure ([`decide`]); carrying it out goes through the injected
//! [`PodKiller`] capability ([`retaliate`]).

mod engine;
mod killer;

pub use engine::{decide, retaliate, Decision, Retaliation, Suppression};
pub use killer::{ApiKiller, DryRunKiller, PodKiller};

#[cfg(test)]
pub use killer::MockPodKiller;
