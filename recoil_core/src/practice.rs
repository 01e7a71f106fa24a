//! Practice-mode scoring.
//!
//! A session records (actual, ideal) point pairs while active and scores the
//! run exactly once, on `stop()`. The last result stays readable until the
//! next `start()`.

use crate::types::{Point, Rgba};
use std::fmt;
use std::time::{Duration, Instant};

/// Score lost per pixel of average deviation.
const DEVIATION_PENALTY: f64 = 2.0;

/// Letter grade, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    D,
    C,
    B,
    BPlus,
    A,
    APlus,
    S,
    SPlus,
}

/// Lower bound (inclusive) of each grade band, best first.
const GRADE_BANDS: [(f64, Grade); 7] = [
    (95.0, Grade::SPlus),
    (90.0, Grade::S),
    (85.0, Grade::APlus),
    (80.0, Grade::A),
    (75.0, Grade::BPlus),
    (70.0, Grade::B),
    (65.0, Grade::C),
];

impl Grade {
    pub fn from_score(score: f64) -> Self {
        GRADE_BANDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|&(_, g)| g)
            .unwrap_or(Grade::D)
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::SPlus => "S+",
            Grade::S => "S",
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            Grade::SPlus | Grade::S => Rgba(1.0, 0.84, 0.0, 1.0),
            Grade::APlus | Grade::A => Rgba(0.2, 1.0, 0.2, 1.0),
            Grade::BPlus | Grade::B => Rgba(0.3, 0.7, 1.0, 1.0),
            Grade::C => Rgba(1.0, 0.6, 0.0, 1.0),
            Grade::D => Rgba(1.0, 0.3, 0.3, 1.0),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `max(0, 100 - avg * 2)`.
pub fn accuracy_score(average_deviation: f64) -> f64 {
    (100.0 - average_deviation * DEVIATION_PENALTY).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PracticeResult {
    pub shots: usize,
    pub average_deviation: f64,
    pub max_deviation: f64,
    pub accuracy_score: f64,
    pub grade: Grade,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    active: bool,
    started_at: Option<Instant>,
    duration: Duration,
    actual: Vec<Point>,
    ideal: Vec<Point>,
    total_deviation: f64,
    max_deviation: f64,
    shots: usize,
    accuracy_score: f64,
    grade: Grade,
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self {
            active: false,
            started_at: None,
            duration: Duration::ZERO,
            actual: Vec::new(),
            ideal: Vec::new(),
            total_deviation: 0.0,
            max_deviation: 0.0,
            shots: 0,
            accuracy_score: 100.0,
            grade: Grade::SPlus,
        }
    }
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything and begin recording.
    pub fn start(&mut self, now: Instant) {
        *self = Self {
            active: true,
            started_at: Some(now),
            ..Self::default()
        };
        tracing::debug!("practice session started");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Record one shot. Returns its deviation, or `None` when not recording.
    pub fn record(&mut self, actual: Point, ideal: Point) -> Option<f64> {
        if !self.active {
            return None;
        }
        let deviation = actual.distance(ideal);
        self.actual.push(actual);
        self.ideal.push(ideal);
        self.total_deviation += deviation;
        self.max_deviation = self.max_deviation.max(deviation);
        self.shots += 1;
        Some(deviation)
    }

    /// Finish the session and score it. Calling `stop` again without a new
    /// `start` returns the same result.
    pub fn stop(&mut self, now: Instant) -> PracticeResult {
        if self.active {
            self.active = false;
            self.duration = self
                .started_at
                .map(|t| now.saturating_duration_since(t))
                .unwrap_or(Duration::ZERO);
            if self.shots > 0 {
                self.accuracy_score = accuracy_score(self.average_deviation());
                self.grade = Grade::from_score(self.accuracy_score);
            }
            tracing::debug!(
                shots = self.shots,
                score = self.accuracy_score,
                grade = %self.grade,
                "practice session scored"
            );
        }
        self.result()
    }

    pub fn result(&self) -> PracticeResult {
        PracticeResult {
            shots: self.shots,
            average_deviation: self.average_deviation(),
            max_deviation: self.max_deviation,
            accuracy_score: self.accuracy_score,
            grade: self.grade,
            duration: self.duration,
        }
    }

    pub fn shots(&self) -> usize {
        self.shots
    }

    pub fn average_deviation(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            self.total_deviation / self.shots as f64
        }
    }

    pub fn max_deviation(&self) -> f64 {
        self.max_deviation
    }

    pub fn actual_points(&self) -> &[Point] {
        &self.actual
    }

    pub fn ideal_points(&self) -> &[Point] {
        &self.ideal
    }

    /// Fraction of a `pattern_len`-step pattern covered so far, in 0..=1.
    pub fn progress(&self, pattern_len: usize) -> f64 {
        if pattern_len == 0 {
            return 0.0;
        }
        (self.shots as f64 / pattern_len as f64).min(1.0)
    }
}
