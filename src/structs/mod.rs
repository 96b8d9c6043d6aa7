pub mod hydration_state;
pub mod timer;
