use crate::{Card, Rating, EF_MIN};
use chrono::{DateTime, Duration, Utc};

const HARD_EF_PENALTY: f64 = 0.15;
const AGAIN_EF_PENALTY: f64 = 0.2;
const EASY_EF_BONUS: f64 = 0.1;
const EASY_INTERVAL_BONUS: f64 = 1.3;

fn floor_ef(x: f64) -> f64 {
    x.max(EF_MIN)
}

/// Interval for the n-th consecutive successful review. Products are
/// truncated to whole days, not rounded.
fn next_interval(reps: u32, prev_interval: u32, ef: f64, first: u32, second: u32, bonus: f64) -> u32 {
    match reps {
        1 => first,
        2 => second,
        _ => (prev_interval.max(1) as f64 * ef * bonus) as u32,
    }
}

/// SM-2 style update of a card's scheduling state for one rating.
pub fn apply_review(card: &mut Card, rating: Rating, now: DateTime<Utc>) {
    card.last_review = Some(now);
    card.modified = now;

    match rating {
        Rating::Again => {
            card.repetition = 0;
            card.interval = 1;
            card.ease_factor = floor_ef(card.ease_factor - AGAIN_EF_PENALTY);
        }
        Rating::Hard => {
            card.repetition += 1;
            card.interval = next_interval(card.repetition, card.interval, card.ease_factor, 1, 6, 1.0);
            card.ease_factor = floor_ef(card.ease_factor - HARD_EF_PENALTY);
        }
        Rating::Good => {
            card.repetition += 1;
            card.interval = next_interval(card.repetition, card.interval, card.ease_factor, 1, 6, 1.0);
        }
        Rating::Easy => {
            card.repetition += 1;
            card.interval = next_interval(
                card.repetition,
                card.interval,
                card.ease_factor,
                4,
                8,
                EASY_INTERVAL_BONUS,
            );
            card.ease_factor += EASY_EF_BONUS;
        }
    }

    card.next_review = now
        .checked_add_signed(Duration::days(card.interval as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
}
