//! Decimal tick math shared by linear, sqrt and sub-second time axes.
//!
//! Steps are always `1`, `2` or `5` times a power of ten, and ticks are
//! computed from integer multiples of the step so they do not accumulate
//! floating-point drift.

pub const DEFAULT_TICK_COUNT: usize = 10;

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TickSpec {
    first: f64,
    last: f64,
    /// Positive: step size. Negative: reciprocal of the step size.
    increment: f64,
}

fn tick_spec(start: f64, stop: f64, count: f64) -> TickSpec {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut first, mut last, increment);
    if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        first = (start * inc).round();
        last = (stop * inc).round();
        if first / inc < start {
            first += 1.0;
        }
        if last / inc > stop {
            last -= 1.0;
        }
        increment = -inc;
    } else {
        let inc = 10f64.powf(power) * factor;
        first = (start / inc).round();
        last = (stop / inc).round();
        if first * inc < start {
            first += 1.0;
        }
        if last * inc > stop {
            last -= 1.0;
        }
        increment = inc;
    }

    if last < first && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }

    TickSpec {
        first,
        last,
        increment,
    }
}

/// Signed tick increment; negative values encode `1 / step` for sub-unit steps.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    tick_spec(start, stop, count as f64).increment
}

/// Tick step for `[start, stop]`, signed by the direction of the span.
#[must_use]
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let reverse = stop < start;
    let increment = if reverse {
        tick_increment(stop, start, count)
    } else {
        tick_increment(start, stop, count)
    };
    let magnitude = if increment < 0.0 {
        1.0 / -increment
    } else {
        increment
    };
    if reverse { -magnitude } else { magnitude }
}

/// Roughly `count` round values inside `[start, stop]`, ascending.
#[must_use]
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let (low, high) = if start < stop {
        (start, stop)
    } else {
        (stop, start)
    };
    let spec = tick_spec(low, high, count as f64);
    if spec.last < spec.first || !spec.increment.is_finite() || spec.increment == 0.0 {
        return Vec::new();
    }

    let n = (spec.last - spec.first + 1.0) as usize;
    (0..n)
        .map(|i| {
            let index = spec.first + i as f64;
            if spec.increment < 0.0 {
                index / -spec.increment
            } else {
                index * spec.increment
            }
        })
        .collect()
}

/// Extends `[start, stop]` outward to multiples of the tick step.
///
/// Iterates until the step stabilizes, at most ten rounds.
#[must_use]
pub fn nice_linear_domain(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if !start.is_finite() || !stop.is_finite() || start == stop {
        return (start, stop);
    }

    let (mut low, mut high) = (start, stop);
    let mut previous_step: Option<f64> = None;
    for _ in 0..10 {
        let step = tick_increment(low, high, count);
        if previous_step == Some(step) {
            break;
        }
        if step > 0.0 {
            low = (low / step).floor() * step;
            high = (high / step).ceil() * step;
        } else if step < 0.0 {
            low = (low * step).ceil() / step;
            high = (high * step).floor() / step;
        } else {
            break;
        }
        previous_step = Some(step);
    }
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_span_yields_tenths() {
        let ticks = linear_ticks(0.0, 1.0, 10);
        assert_eq!(ticks.len(), 11);
        assert!((ticks[3] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn nice_rounds_outward() {
        assert_eq!(nice_linear_domain(0.3, 9.7, 10), (0.0, 10.0));
        assert_eq!(nice_linear_domain(0.0, 1043.0, 10), (0.0, 1100.0));
    }

    #[test]
    fn step_is_signed_by_direction() {
        assert_eq!(tick_step(0.0, 100.0, 10), 10.0);
        assert_eq!(tick_step(100.0, 0.0, 10), -10.0);
    }
}
