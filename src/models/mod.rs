pub mod cluster_state;
pub mod pod;

pub use cluster_state::*;
pub use pod::*;
