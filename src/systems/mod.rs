//! Systems module - simulation logic and the ECS systems that drive it.

pub mod collision;
pub mod gate;
pub mod kinematics;
pub mod logic;
