//! Exponential smoothing of composite latency into a 0-100 load value.

/// Largest value the normalized load can take.
pub const MAX_LOAD: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct LoadSmoother {
    alpha: f64,
    scale: f64,
    ema: f64,
}

impl LoadSmoother {
    pub fn new(alpha: f64, scale: f64) -> Self {
        Self {
            alpha,
            scale,
            ema: 0.0,
        }
    }

    /// Fold a composite value into the EMA and return the normalized load.
    pub fn update(&mut self, composite: f64) -> f64 {
        self.ema = self.alpha * composite + (1.0 - self.alpha) * self.ema;
        self.load()
    }

    /// `clamp(ema / scale, 0, 100)`. A non-finite EMA maps to 0.
    pub fn load(&self) -> f64 {
        let load = self.ema / self.scale;
        if load.is_nan() {
            return 0.0;
        }
        load.clamp(0.0, MAX_LOAD)
    }

    pub fn ema(&self) -> f64 {
        self.ema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_starts_at_zero() {
        let mut smoother = LoadSmoother::new(0.15, 2.0);
        assert_eq!(smoother.ema(), 0.0);

        let load = smoother.update(100.0);
        assert!((smoother.ema() - 15.0).abs() < 1e-9);
        assert!((load - 7.5).abs() < 1e-9);

        smoother.update(100.0);
        assert!((smoother.ema() - (15.0 + 0.85 * 15.0)).abs() < 1e-9);
    }

    #[test]
    fn test_load_is_clamped() {
        let mut smoother = LoadSmoother::new(0.15, 2.0);
        for _ in 0..100 {
            smoother.update(1.0e6);
        }
        assert_eq!(smoother.load(), MAX_LOAD);

        let mut smoother = LoadSmoother::new(0.15, 2.0);
        smoother.update(-50.0);
        assert_eq!(smoother.load(), 0.0);
    }
}
