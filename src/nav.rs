//! Navigation control: the motor-state machine that steers the trolley
//! toward the tracked target.

mod controller;

pub use controller::{MotorState, NavController};
