// src/meditation.rs
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingPattern {
    pub name: &'static str,
    pub inhale: u32,
    pub hold: u32,
    pub exhale: u32,
    pub hold_empty: u32,
}

pub const BOX_BREATHING: BreathingPattern = BreathingPattern {
    name: "Box Breathing",
    inhale: 4,
    hold: 4,
    exhale: 4,
    hold_empty: 4,
};

pub const FOUR_SEVEN_EIGHT: BreathingPattern = BreathingPattern {
    name: "4-7-8 Technique",
    inhale: 4,
    hold: 7,
    exhale: 8,
    hold_empty: 0,
};

pub const DEEP_CALM: BreathingPattern = BreathingPattern {
    name: "Deep Calm",
    inhale: 5,
    hold: 2,
    exhale: 6,
    hold_empty: 0,
};

pub const PATTERNS: [BreathingPattern; 3] = [BOX_BREATHING, FOUR_SEVEN_EIGHT, DEEP_CALM];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
    HoldEmpty,
}

impl BreathPhase {
    fn next(self) -> BreathPhase {
        match self {
            BreathPhase::Inhale => BreathPhase::Hold,
            BreathPhase::Hold => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::HoldEmpty,
            BreathPhase::HoldEmpty => BreathPhase::Inhale,
        }
    }
}

impl BreathingPattern {
    pub fn phase_seconds(&self, phase: BreathPhase) -> u32 {
        match phase {
            BreathPhase::Inhale => self.inhale,
            BreathPhase::Hold => self.hold,
            BreathPhase::Exhale => self.exhale,
            BreathPhase::HoldEmpty => self.hold_empty,
        }
    }

    pub fn cycle_seconds(&self) -> u32 {
        self.inhale + self.hold + self.exhale + self.hold_empty
    }
}

/// Snapshot returned after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub running: bool,
    pub elapsed: u32,
    pub phase: BreathPhase,
    pub phase_elapsed: u32,
    pub breath_count: u32,
    pub finished: bool,
}

/// One-second-resolution breathing session.
///
/// The caller drives it by calling [`MeditationTimer::tick`] once per second
/// while it is running; nothing here owns a clock.
#[derive(Debug, Clone)]
pub struct MeditationTimer {
    pattern: BreathingPattern,
    duration: u32,
    running: bool,
    elapsed: u32,
    phase: BreathPhase,
    phase_elapsed: u32,
    breath_count: u32,
}

impl MeditationTimer {
    pub fn new(pattern: BreathingPattern, duration: u32) -> Self {
        Self {
            pattern,
            duration,
            running: false,
            elapsed: 0,
            phase: BreathPhase::Inhale,
            phase_elapsed: 0,
            breath_count: 0,
        }
    }

    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn start(&mut self) {
        if !self.is_finished() && self.pattern.cycle_seconds() > 0 {
            self.running = true;
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.pattern.clone(), self.duration);
    }

    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            running: self.running,
            elapsed: self.elapsed,
            phase: self.phase,
            phase_elapsed: self.phase_elapsed,
            breath_count: self.breath_count,
            finished: self.is_finished(),
        }
    }

    pub fn tick(&mut self) -> TimerStatus {
        if !self.running {
            return self.status();
        }

        self.elapsed += 1;
        self.phase_elapsed += 1;

        if self.phase_elapsed >= self.pattern.phase_seconds(self.phase) {
            self.advance_phase();
        }

        if self.is_finished() {
            self.running = false;
        }

        self.status()
    }

    fn advance_phase(&mut self) {
        self.phase_elapsed = 0;
        // Zero-length phases are skipped. start() refuses an all-zero
        // pattern, so this terminates within four steps.
        let mut next = self.phase.next();
        while self.pattern.phase_seconds(next) == 0 {
            next = next.next();
        }
        if next == BreathPhase::Inhale {
            self.breath_count += 1;
        }
        self.phase = next;
    }
}
