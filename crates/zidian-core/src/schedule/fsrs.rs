//! FSRS-5 (Free Spaced Repetition Scheduler)
//!
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! ## Core formulas
//! - Retrievability: R = (1 + FACTOR * t / S)^DECAY, DECAY = -0.5, FACTOR = 19/81
//! - Interval: t = S / FACTOR * (R^(1/DECAY) - 1)
//!
//! Cards here are scheduled in whole days. Learning steps that FSRS would
//! place minutes apart land on the same day (`scheduled_days = 0`).

use chrono::{Days, NaiveDate};

use super::{Rating, Scheduler};
use crate::card::{is_storable_date, latest_storable_date, Card, CardFields, CardState};

/// FSRS-5 default weights (19 parameters)
pub const DEFAULT_WEIGHTS: [f64; 19] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

/// Target probability of recall at the scheduled review
pub const DEFAULT_RETENTION: f64 = 0.9;

pub const MIN_STABILITY: f64 = 0.01;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

const DECAY: f64 = -0.5;
const FACTOR: f64 = 19.0 / 81.0;

/// Tunable FSRS parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FsrsParameters {
    pub weights: [f64; 19],
    pub request_retention: f64,
    /// Upper bound on any interval, in days
    pub maximum_interval: u32,
}

impl Default for FsrsParameters {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
            request_retention: DEFAULT_RETENTION,
            maximum_interval: 36500,
        }
    }
}

/// Day-granular FSRS-5 scheduler
#[derive(Debug, Clone, Default)]
pub struct FsrsScheduler {
    params: FsrsParameters,
}

impl FsrsScheduler {
    pub fn new(params: FsrsParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &FsrsParameters {
        &self.params
    }

    fn w(&self, i: usize) -> f64 {
        self.params.weights[i]
    }

    /// Probability of recall after `elapsed_days` at stability `stability`
    pub fn retrievability(&self, elapsed_days: f64, stability: f64) -> f64 {
        (1.0 + FACTOR * elapsed_days / stability.max(MIN_STABILITY)).powf(DECAY)
    }

    /// Days until recall probability falls to the requested retention
    pub fn next_interval(&self, stability: f64) -> u32 {
        let raw = stability / FACTOR * (self.params.request_retention.powf(1.0 / DECAY) - 1.0);
        (raw.round().max(1.0) as u32).min(self.max_interval())
    }

    fn max_interval(&self) -> u32 {
        self.params.maximum_interval.max(1)
    }

    pub fn initial_stability(&self, rating: Rating) -> f64 {
        self.w(rating.value() as usize - 1).max(MIN_STABILITY)
    }

    pub fn initial_difficulty(&self, rating: Rating) -> f64 {
        self.raw_initial_difficulty(rating)
            .clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }

    fn raw_initial_difficulty(&self, rating: Rating) -> f64 {
        let g = rating.value() as f64;
        self.w(4) - (self.w(5) * (g - 1.0)).exp() + 1.0
    }

    pub fn next_difficulty(&self, difficulty: f64, rating: Rating) -> f64 {
        let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        let delta = -self.w(6) * (rating.value() as f64 - 3.0);
        // Linear damping: changes shrink as difficulty approaches the ceiling.
        let damped = d + delta * (MAX_DIFFICULTY - d) / 9.0;
        let target = self.raw_initial_difficulty(Rating::Easy);
        (self.w(7) * target + (1.0 - self.w(7)) * damped).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }

    pub fn next_recall_stability(
        &self,
        difficulty: f64,
        stability: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64 {
        let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        let s = stability.max(MIN_STABILITY);
        let hard_penalty = if rating == Rating::Hard { self.w(15) } else { 1.0 };
        let easy_bonus = if rating == Rating::Easy { self.w(16) } else { 1.0 };
        let growth = self.w(8).exp()
            * (11.0 - d)
            * s.powf(-self.w(9))
            * (((1.0 - retrievability) * self.w(10)).exp() - 1.0)
            * hard_penalty
            * easy_bonus;
        (s * (1.0 + growth)).max(MIN_STABILITY)
    }

    pub fn next_forget_stability(&self, difficulty: f64, stability: f64, retrievability: f64) -> f64 {
        let d = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        let s = stability.max(MIN_STABILITY);
        let forget = self.w(11)
            * d.powf(-self.w(12))
            * ((s + 1.0).powf(self.w(13)) - 1.0)
            * ((1.0 - retrievability) * self.w(14)).exp();
        // A lapse never leaves the card more stable than a same-day relearn would.
        let ceiling = s / (self.w(17) * self.w(18)).exp();
        forget.min(ceiling).max(MIN_STABILITY)
    }

    pub fn short_term_stability(&self, stability: f64, rating: Rating) -> f64 {
        let g = rating.value() as f64;
        (stability.max(MIN_STABILITY) * (self.w(17) * (g - 3.0 + self.w(18))).exp())
            .max(MIN_STABILITY)
    }

    /// Intervals for hard/good/easy, forced into strictly useful order
    fn ordered_intervals(&self, hard: f64, good: f64, easy: f64) -> (u32, u32, u32) {
        let mut hard_ivl = self.next_interval(hard);
        let mut good_ivl = self.next_interval(good);
        let mut easy_ivl = self.next_interval(easy);
        let max = self.max_interval();
        hard_ivl = hard_ivl.min(good_ivl);
        good_ivl = good_ivl.max(hard_ivl + 1).min(max);
        easy_ivl = easy_ivl.max(good_ivl + 1).min(max);
        // At the cap, make room below it instead of pushing past it.
        good_ivl = good_ivl.min(easy_ivl.saturating_sub(1).max(1));
        hard_ivl = hard_ivl.min(good_ivl.saturating_sub(1).max(1));
        (hard_ivl, good_ivl, easy_ivl)
    }
}

impl Scheduler for FsrsScheduler {
    fn compute_next_state(&self, card: &Card, rating: Rating, today: NaiveDate) -> CardFields {
        let elapsed_days = card
            .last_review
            .map(|last| (today - last).num_days().max(0) as u32)
            .unwrap_or(0);

        let mut next = card.fields();
        next.reps = card.reps.saturating_add(1);
        next.elapsed_days = elapsed_days;
        next.last_review = Some(today);

        let scheduled_days = match card.state {
            CardState::New => {
                next.difficulty = self.initial_difficulty(rating);
                next.stability = self.initial_stability(rating);
                if rating == Rating::Easy {
                    next.state = CardState::Review;
                    self.next_interval(next.stability)
                } else {
                    next.state = CardState::Learning;
                    0
                }
            }
            CardState::Learning | CardState::Relearning => {
                next.difficulty = self.next_difficulty(card.difficulty, rating);
                next.stability = self.short_term_stability(card.stability, rating);
                match rating {
                    Rating::Again | Rating::Hard => 0,
                    Rating::Good => {
                        next.state = CardState::Review;
                        self.next_interval(next.stability)
                    }
                    Rating::Easy => {
                        next.state = CardState::Review;
                        let good = self.short_term_stability(card.stability, Rating::Good);
                        self.next_interval(next.stability)
                            .max(self.next_interval(good) + 1)
                            .min(self.max_interval())
                    }
                }
            }
            CardState::Review => {
                let r = self.retrievability(elapsed_days as f64, card.stability);
                next.difficulty = self.next_difficulty(card.difficulty, rating);
                if rating == Rating::Again {
                    next.stability = self.next_forget_stability(card.difficulty, card.stability, r);
                    next.lapses = card.lapses.saturating_add(1);
                    next.state = CardState::Relearning;
                    0
                } else {
                    let recall = |g| self.next_recall_stability(card.difficulty, card.stability, r, g);
                    let (hard_s, good_s, easy_s) =
                        (recall(Rating::Hard), recall(Rating::Good), recall(Rating::Easy));
                    let (hard, good, easy) = self.ordered_intervals(hard_s, good_s, easy_s);
                    let (stability, interval) = match rating {
                        Rating::Hard => (hard_s, hard),
                        Rating::Easy => (easy_s, easy),
                        _ => (good_s, good),
                    };
                    next.stability = stability;
                    next.state = CardState::Review;
                    interval
                }
            }
        };

        next.due = today
            .checked_add_days(Days::new(scheduled_days as u64))
            .filter(|due| is_storable_date(*due))
            .or_else(latest_storable_date)
            .unwrap_or(today)
            .max(today);
        next.scheduled_days = (next.due - today).num_days() as u32;
        next
    }
}
