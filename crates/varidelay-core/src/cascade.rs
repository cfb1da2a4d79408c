//! Cascade of identical one-pole smoothing stages.
//!
//! Each stage runs the difference equation
//!
//! ```text
//! y[n] = a * x[n] + (1 - a) * y[n-1]
//! ```
//!
//! and feeds its output to the next. All stages share the coefficient `a`,
//! which is supplied per sample so it can follow a control parameter without
//! any recalculation. Four stages give a 24 dB/octave rolloff.
//!
//! | `a` | Behaviour |
//! |-----|-----------|
//! | 1.0 | Identity, output equals input |
//! | 0.5 | Moderate smoothing |
//! | 0.0 | Output frozen at the current state |

/// Number of stages used when none is configured.
pub const DEFAULT_STAGES: usize = 4;

/// N sequential one-pole lowpass stages with a shared coefficient.
///
/// # Invariants
///
/// - every stage state is overwritten exactly once per [`apply`](Self::apply),
///   in stage order
/// - the stage count is fixed after construction
#[derive(Debug, Clone)]
pub struct FilterCascade {
    stages: Vec<f32>,
}

impl FilterCascade {
    /// Create a cascade of `stages` zeroed stages.
    pub fn new(stages: usize) -> Self {
        Self {
            stages: vec![0.0; stages],
        }
    }

    /// Filter one sample through every stage.
    ///
    /// `coefficient` is clamped to `[0, 1]`. With no stages the input is
    /// returned unchanged.
    #[inline]
    pub fn apply(&mut self, input: f32, coefficient: f32) -> f32 {
        let a = coefficient.clamp(0.0, 1.0);
        let b = 1.0 - a;
        let mut x = input;
        for state in &mut self.stages {
            *state = a * x + b * *state;
            x = *state;
        }
        x
    }

    /// Zero every stage.
    pub fn reset(&mut self) {
        self.stages.fill(0.0);
    }

    /// Number of stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Stage states, first stage first.
    pub fn states(&self) -> &[f32] {
        &self.stages
    }
}

impl Default for FilterCascade {
    fn default() -> Self {
        Self::new(DEFAULT_STAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_coefficient_is_identity() {
        let mut f = FilterCascade::default();
        for &x in &[0.3, -0.7, 1.0, 0.0, 0.123_456] {
            assert_eq!(f.apply(x, 1.0), x);
        }
    }

    #[test]
    fn passes_dc() {
        let mut f = FilterCascade::new(4);
        let mut out = 0.0;
        for _ in 0..1000 {
            out = f.apply(1.0, 0.1);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC should pass through, got {out}");
    }

    #[test]
    fn stages_chain_in_order() {
        let mut f = FilterCascade::new(3);
        let out = f.apply(1.0, 0.5);
        assert_eq!(f.states(), &[0.5, 0.25, 0.125]);
        assert_eq!(out, 0.125);
    }

    #[test]
    fn zero_coefficient_freezes_state() {
        let mut f = FilterCascade::new(2);
        f.apply(1.0, 1.0);
        assert_eq!(f.apply(0.0, 0.0), 1.0);
        assert_eq!(f.apply(-1.0, 0.0), 1.0);
    }

    #[test]
    fn attenuates_nyquist() {
        let mut f = FilterCascade::new(4);
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += f.apply(input, 0.2).abs();
        }
        assert!(sum / 4800.0 < 0.01);
    }

    #[test]
    fn reset_clears_state() {
        let mut f = FilterCascade::new(4);
        f.apply(1.0, 0.5);
        f.reset();
        assert!(f.states().iter().all(|&s| s == 0.0));
        assert_eq!(f.apply(0.0, 0.5), 0.0);
    }

    #[test]
    fn empty_cascade_passes_through() {
        let mut f = FilterCascade::new(0);
        assert_eq!(f.stage_count(), 0);
        assert_eq!(f.apply(0.4, 0.1), 0.4);
    }
}
