//! Fixed-frame simulation clock.
//!
//! The clock counts frames and accumulates the simulated seconds handed to
//! the world. It does not sleep or read wall time; the runner decides how
//! much time each frame covers.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Frame counter would overflow.
    #[error("frame counter overflow: cannot advance beyond u64::MAX")]
    FrameOverflow,

    /// Invalid clock configuration (e.g. zero-length frames).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Frame counter plus accumulated simulated seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    /// Frames advanced so far.
    frame: u64,

    /// Simulated seconds advanced so far.
    elapsed: f64,

    /// Nominal length of one frame in seconds.
    frame_seconds: f64,
}

impl SimClock {
    /// Create a clock at frame 0 with the given nominal frame length.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] unless `frame_seconds` is
    /// finite and positive.
    pub fn new(frame_seconds: f64) -> Result<Self, ClockError> {
        if !frame_seconds.is_finite() || frame_seconds <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("frame_seconds must be finite and positive, got {frame_seconds}"),
            });
        }
        Ok(Self {
            frame: 0,
            elapsed: 0.0,
            frame_seconds,
        })
    }

    /// Advance by one frame covering `seconds`. Returns the new frame
    /// number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::FrameOverflow`] if the frame counter would
    /// exceed `u64::MAX`.
    pub fn advance(&mut self, seconds: f64) -> Result<u64, ClockError> {
        self.frame = self.frame.checked_add(1).ok_or(ClockError::FrameOverflow)?;
        self.elapsed += seconds;
        Ok(self.frame)
    }

    /// Frames advanced so far.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds advanced so far.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Nominal frame length in seconds.
    pub const fn frame_seconds(&self) -> f64 {
        self.frame_seconds
    }
}
