//! Error types for stepper-coord.
//!
//! Startup failures are [`ConfigError`]s, actuator rejections are
//! [`CommandError`]s. Input bounce is never an error: the debounce path
//! absorbs it.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-coord operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration parsing, validation or device bring-up error
    Config(ConfigError),
    /// Actuator command rejected
    Command(CommandError),
    /// GPIO operation failed
    Gpio(GpioError),
    /// Delayed task queue error
    Queue(QueueError),
    /// Completion signal wait error
    Signal(SignalError),
}

/// Configuration-related errors. All of them abort startup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid step resolution (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidStepResolution(u16),
    /// Invalid max velocity (must be > 0)
    InvalidMaxVelocity(u32),
    /// Debounce window must be > 0 ms
    InvalidDebounceWindow(u64),
    /// Flash duration must be > 0 ms
    InvalidFlashDuration(u64),
    /// Heartbeat period must be > 0 ms
    InvalidHeartbeatPeriod(u64),
    /// Invalid soft limits (min must be < max)
    InvalidSoftLimits {
        /// Minimum limit value
        min: i64,
        /// Maximum limit value
        max: i64,
    },
    /// A control-loop target lies outside the motor's soft limits
    TargetOutsideLimits {
        /// Offending target in steps
        target: i64,
        /// Minimum limit value
        min: i64,
        /// Maximum limit value
        max: i64,
    },
    /// Duplicate input line name
    DuplicateInput(heapless::String<32>),
    /// More input lines than the coordinator can hold
    TooManyInputs(usize),
    /// A required device or line is absent or not ready
    DeviceNotReady(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Actuator command errors. Fatal to the issuing control loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Actuator driver is not ready
    NotReady,
    /// Actuator is disabled
    Disabled,
    /// Velocity value rejected by the driver
    InvalidVelocity(u32),
    /// Step resolution rejected by the driver
    UnsupportedResolution(u16),
    /// Position exceeds soft limits
    LimitExceeded {
        /// Requested position
        position: i64,
        /// Limit that was exceeded (min or max)
        limit: i64,
    },
    /// Controller is in wrong state for requested operation
    InvalidState(&'static str),
    /// Driver-internal failure
    Driver(heapless::String<64>),
}

/// GPIO errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Reading an input line failed
    Read(heapless::String<32>),
    /// Driving an output line failed
    Write,
}

/// Delayed task queue errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// Every task slot is taken by another task key
    Full,
    /// The worker has been shut down
    Shutdown,
    /// The worker thread could not be spawned
    Spawn,
}

/// Completion signal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalError {
    /// The timeout elapsed before the signal was raised
    Timeout,
    /// Another context is already waiting on the signal
    Busy,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Command(e) => write!(f, "Command error: {}", e),
            Error::Gpio(e) => write!(f, "GPIO error: {}", e),
            Error::Queue(e) => write!(f, "Task queue error: {}", e),
            Error::Signal(e) => write!(f, "Signal error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepResolution(v) => {
                write!(f, "Invalid step resolution: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidMaxVelocity(v) => write!(f, "Invalid max velocity: {}. Must be > 0", v),
            ConfigError::InvalidDebounceWindow(v) => write!(f, "Invalid debounce window: {} ms. Must be > 0", v),
            ConfigError::InvalidFlashDuration(v) => write!(f, "Invalid flash duration: {} ms. Must be > 0", v),
            ConfigError::InvalidHeartbeatPeriod(v) => write!(f, "Invalid heartbeat period: {} ms. Must be > 0", v),
            ConfigError::InvalidSoftLimits { min, max } => {
                write!(f, "Invalid soft limits: min ({}) must be < max ({})", min, max)
            }
            ConfigError::TargetOutsideLimits { target, min, max } => {
                write!(f, "Target {} outside limits [{}, {}]", target, min, max)
            }
            ConfigError::DuplicateInput(name) => write!(f, "Duplicate input name: '{}'", name),
            ConfigError::TooManyInputs(n) => write!(f, "Too many inputs: {}", n),
            ConfigError::DeviceNotReady(name) => write!(f, "Device '{}' not ready", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotReady => write!(f, "Actuator not ready"),
            CommandError::Disabled => write!(f, "Actuator disabled"),
            CommandError::InvalidVelocity(v) => write!(f, "Velocity {} rejected", v),
            CommandError::UnsupportedResolution(v) => write!(f, "Step resolution {} not supported", v),
            CommandError::LimitExceeded { position, limit } => {
                write!(f, "Position {} exceeds limit {}", position, limit)
            }
            CommandError::InvalidState(state) => write!(f, "Invalid controller state: {}", state),
            CommandError::Driver(msg) => write!(f, "Driver failure: {}", msg),
        }
    }
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::Read(line) => write!(f, "Reading line '{}' failed", line),
            GpioError::Write => write!(f, "Driving output pin failed"),
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full => write!(f, "Task queue full"),
            QueueError::Shutdown => write!(f, "Worker shut down"),
            QueueError::Spawn => write!(f, "Failed to spawn worker thread"),
        }
    }
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::Timeout => write!(f, "Timed out waiting for signal"),
            SignalError::Busy => write!(f, "Signal already has a waiter"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Error::Gpio(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Queue(e)
    }
}

impl From<SignalError> for Error {
    fn from(e: SignalError) -> Self {
        Error::Signal(e)
    }
}

impl Error {
    /// Whether this error aborts startup rather than a running loop.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Copy `s` into a bounded string, truncating on a char boundary.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

#[cfg(feature = "std")]
impl std::error::Error for GpioError {}

#[cfg(feature = "std")]
impl std::error::Error for QueueError {}

#[cfg(feature = "std")]
impl std::error::Error for SignalError {}
