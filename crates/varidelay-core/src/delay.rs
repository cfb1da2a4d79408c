//! Smoothed fractional delay line.
//!
//! A fixed-capacity circular buffer whose effective length follows a
//! normalized target with exponential smoothing, so delay changes glide
//! instead of clicking. Reads interpolate linearly between adjacent slots.
//!
//! # Geometry
//!
//! ```text
//!   capacity = sample_rate × max_delay_seconds
//!   span     = capacity − block_size
//!   lag      = max(current × span, 1)        (samples behind the write cursor)
//! ```
//!
//! | Delay target | Lag |
//! |--------------|-----|
//! | 0.0 | 1 sample |
//! | 0.5 | `span / 2` samples |
//! | 1.0 | `span` samples |
//!
//! The lag never drops below one sample, so a read never sees the slot that
//! is about to be written in the same step. It never exceeds `span`, so one
//! block of slots is always unreadable and the oldest readable sample is at
//! least a block away from being overwritten.
//!
//! Delay arithmetic runs in `f64`. At 96 000 samples of capacity an `f32`
//! smoothing step underflows while the residual error is still hundreds of
//! samples.

use crate::error::{Result, SessionError};

/// Circular delay buffer with a smoothed, fractional read position.
///
/// # Memory
///
/// The buffer is allocated once in [`new`](Self::new) and never reallocated.
/// [`read`](Self::read) and [`write`](Self::write) do not allocate.
///
/// # Example
///
/// ```rust
/// use varidelay_core::DelayLine;
///
/// // 1 s at 48 kHz, 128-frame blocks, no glide
/// let mut line = DelayLine::new(48_000, 128, 1.0).unwrap();
/// line.snap_delay(0.0);
/// line.write(1.0);
/// assert_eq!(line.read(0.0), 1.0); // one-sample lag
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Circular buffer storage
    buffer: Vec<f32>,
    /// Next slot to be written
    write_pos: usize,
    /// Normalized delay in effect
    current: f64,
    /// Per-sample smoothing coefficient in (0, 1]
    glide: f64,
    /// Frames per block reserved as headroom
    block_size: usize,
    /// Usable length in samples (`capacity - block_size`)
    span: f64,
}

impl DelayLine {
    /// Creates a delay line of `capacity` samples reserving `block_size`
    /// slots of headroom.
    ///
    /// `glide` is the per-sample smoothing coefficient; `1.0` jumps straight
    /// to the target and `1 / sample_rate` gives a one-second time constant.
    /// Values outside `(0, 1]` are clamped into it.
    ///
    /// # Errors
    ///
    /// [`SessionError::ZeroBlockSize`] if `block_size` is 0 and
    /// [`SessionError::BlockExceedsCapacity`] if `block_size >= capacity`.
    pub fn new(capacity: usize, block_size: usize, glide: f64) -> Result<Self> {
        if block_size == 0 {
            return Err(SessionError::ZeroBlockSize);
        }
        if block_size >= capacity {
            return Err(SessionError::BlockExceedsCapacity {
                block_size,
                capacity,
            });
        }
        let glide = if glide.is_nan() {
            1.0
        } else {
            glide.clamp(f64::MIN_POSITIVE, 1.0)
        };

        Ok(Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
            current: 0.0,
            glide,
            block_size,
            span: (capacity - block_size) as f64,
        })
    }

    /// Advances the smoothed delay one step towards `target` and returns the
    /// interpolated sample at the resulting position.
    ///
    /// `target` is clamped to `[0, 1]`; NaN holds the current delay.
    #[inline]
    pub fn read(&mut self, target: f32) -> f32 {
        if !target.is_nan() {
            let target = f64::from(target).clamp(0.0, 1.0);
            self.current += self.glide * (target - self.current);
        }

        let len = self.buffer.len();
        let lag = (self.current * self.span).max(1.0);
        let mut read_pos = self.write_pos as f64 - lag;
        if read_pos < 0.0 {
            read_pos += len as f64;
        }

        let base = read_pos.floor();
        let frac = (read_pos - base) as f32;
        // Rounding can land exactly on `len`.
        let i0 = (base as usize) % len;
        let i1 = (i0 + 1) % len;

        let a = self.buffer[i0];
        let b = self.buffer[i1];
        a + (b - a) * frac
    }

    /// Writes a sample at the cursor and advances it.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Sets the smoothed delay directly, skipping the glide.
    pub fn snap_delay(&mut self, delay: f32) {
        if !delay.is_nan() {
            self.current = f64::from(delay).clamp(0.0, 1.0);
        }
    }

    /// Clears the buffer and rewinds the cursor. The smoothed delay is kept.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Slot the next [`write`](Self::write) fills.
    pub fn write_cursor(&self) -> usize {
        self.write_pos
    }

    /// Headroom reserved at construction.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Normalized delay currently in effect.
    pub fn current_delay(&self) -> f64 {
        self.current
    }

    /// Effective delay in samples, `current × (capacity − block_size)`.
    pub fn delay_samples(&self) -> f64 {
        self.current * self.span
    }
}
