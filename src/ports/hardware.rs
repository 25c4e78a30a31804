//! Motor and stacklight actuation port.

/// Stacklight lamp colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StacklightColor {
    Green,
    Amber,
    Red,
}

/// Trolley actuation and sensing port.
///
/// Commands are fire-and-forget from the controller's perspective; the
/// implementation owns duty-cycle interpretation and the GPIO details.
pub trait Trolley {
    /// Error type for hardware failures.
    type Error: std::error::Error + Send + Sync + 'static;

    fn turn_left(&mut self, duty_cycle: u8) -> Result<(), Self::Error>;

    fn turn_right(&mut self, duty_cycle: u8) -> Result<(), Self::Error>;

    fn forward(&mut self, duty_cycle: u8) -> Result<(), Self::Error>;

    /// Stop the drive motors. Idempotent.
    fn stop(&mut self) -> Result<(), Self::Error>;

    fn set_stacklight(&mut self, color: StacklightColor, on: bool) -> Result<(), Self::Error>;

    /// Whether the path directly ahead is free of obstacles. Blocking
    /// sensor read; failures propagate, there are no retries.
    fn front_proximity_clear(&mut self) -> Result<bool, Self::Error>;
}
