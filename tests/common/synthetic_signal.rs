use aeb_kpi::{Channel, Signal};

pub const RATE_HZ: f64 = 100.0;
/// Deceleration request while AEB is idle.
pub const IDLE_REQUEST: f64 = 30.0;
pub const RESPONSE_DELAY_S: f64 = 0.05;
/// Jerk limit of the measured response (m/s³)
pub const MAX_JERK: f64 = 40.0;

/// One braking request `[on, off)` at `level` m/s².
#[derive(Clone, Copy, Debug)]
pub struct BrakeRequest {
    pub on: f64,
    pub off: f64,
    pub level: f64,
}

impl BrakeRequest {
    pub fn partial(on: f64, off: f64) -> Self {
        Self { on, off, level: -6.0 }
    }

    fn active(&self, t: f64) -> bool {
        t >= self.on - 1e-9 && t < self.off - 1e-9
    }
}

/// Synthetic AEB recording sampled at 100 Hz.
///
/// Ego speed ramps linearly from `start_speed` to 0 m/s at the last sample.
/// The measured longitudinal acceleration follows each request with 50 ms
/// delay and a 40 m/s³ jerk limit; pedal, steering and yaw stay at zero and the
/// target is tracked from 1 s onwards.
pub fn aeb_recording(duration_s: f64, start_speed: f64, requests: &[BrakeRequest]) -> Signal {
    let n = (duration_s * RATE_HZ).round() as usize;
    let time: Vec<f64> = (0..n).map(|i| i as f64 / RATE_HZ).collect();
    let last = (n - 1) as f64;

    let request = |t: f64| {
        requests
            .iter()
            .find(|r| r.active(t))
            .map_or(IDLE_REQUEST, |r| r.level)
    };
    let decel = time.iter().map(|&t| request(t)).collect();
    let speed = (0..n).map(|i| start_speed * (1.0 - i as f64 / last)).collect();
    let long_accel = slew_limited(&time, |t| {
        let demanded = request(t - RESPONSE_DELAY_S);
        if demanded == IDLE_REQUEST {
            0.0
        } else {
            demanded
        }
    });
    let gap = time
        .iter()
        .map(|&t| if t >= 1.0 { 80.0 - 3.0 * t } else { 0.0 })
        .collect();

    Signal::from_channels(
        time,
        [
            (Channel::TargetDecel, decel),
            (Channel::EgoSpeed, speed),
            (Channel::LongAccel, long_accel),
            (Channel::LatAccel, vec![0.0; n]),
            (Channel::Throttle, vec![0.0; n]),
            (Channel::YawRate, vec![0.0; n]),
            (Channel::SteerAngle, vec![0.0; n]),
            (Channel::SteerRate, vec![0.0; n]),
            (Channel::LongGap, gap),
        ],
    )
    .expect("synthetic channels share the time base")
}

/// Track `target(t)` with at most [`MAX_JERK`] change per second.
fn slew_limited(time: &[f64], target: impl Fn(f64) -> f64) -> Vec<f64> {
    let step = MAX_JERK / RATE_HZ;
    let mut current = 0.0_f64;
    time.iter()
        .map(|&t| {
            current += (target(t) - current).clamp(-step, step);
            current
        })
        .collect()
}
