pub mod phase_windows;
pub mod status;

pub use phase_windows::{PhaseWindowCalculator, calculate_phase_dates};
pub use status::{BatchStatusResolver, determine_status};
