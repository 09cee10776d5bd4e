/// Linearly remap `value` from `[istart, istop]` onto `[ostart, ostop]`.
pub fn range_map(value: f32, istart: f32, istop: f32, ostart: f32, ostop: f32) -> f32 {
    ostart + (ostop - ostart) * ((value - istart) / (istop - istart))
}

/// Wrapping clock for the day/night cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct DayCycle {
    day_secs: f32,
    current: f32,
}

impl DayCycle {
    pub fn new(day_duration_minutes: f32) -> Self {
        DayCycle { day_secs: (day_duration_minutes * 60.0).max(f32::EPSILON), current: 0.0 }
    }

    pub fn update(&mut self, dt: f32) {
        self.current = (self.current + dt).rem_euclid(self.day_secs);
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }

    /// Seconds into the current day.
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn day_progress(&self) -> f32 {
        self.current / self.day_secs
    }

    /// Daylight is the first half of the cycle.
    pub fn is_day(&self) -> bool {
        self.current < self.day_secs / 2.0
    }

    pub fn map_time(&self, start: f32, end: f32) -> f32 {
        range_map(self.current, 0.0, self.day_secs, start, end)
    }
}

/// Countdown for a passenger round.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundTimer {
    duration: f32,
    remaining: f32,
}

impl RoundTimer {
    pub fn new(duration_secs: f32) -> Self {
        RoundTimer { duration: duration_secs, remaining: duration_secs }
    }

    /// Advance the clock; returns `true` once time has run out.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.is_expired()
    }

    pub fn add_bonus(&mut self, secs: f32) {
        if !self.is_expired() {
            self.remaining += secs;
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }
}
