use anktui_core::{apply_review, Card, Rating, EF_MIN};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
}

fn arb_rating() -> impl Strategy<Value = Rating> {
    prop::sample::select(Rating::ALL.to_vec())
}

fn card_with(interval: u32, repetition: u32, ease_factor: f64) -> Card {
    let mut c = Card::new("q", "a", t0());
    c.interval = interval;
    c.repetition = repetition;
    c.ease_factor = ease_factor;
    c
}

proptest! {
    #[test]
    fn ease_never_below_floor(ratings in prop::collection::vec(arb_rating(), 0..60)) {
        let mut card = Card::new("q", "a", t0());
        for r in ratings {
            apply_review(&mut card, r, t0());
            prop_assert!(card.ease_factor >= EF_MIN);
            prop_assert!(card.interval >= 1);
        }
    }

    #[test]
    fn again_always_resets(
        interval in 1u32..5000,
        repetition in 0u32..50,
        ease in 1.3f64..5.0,
    ) {
        let mut card = card_with(interval, repetition, ease);
        apply_review(&mut card, Rating::Again, t0());
        prop_assert_eq!(card.repetition, 0);
        prop_assert_eq!(card.interval, 1);
        prop_assert_eq!(card.ease_factor, (ease - 0.2).max(EF_MIN));
    }

    #[test]
    fn easy_never_schedules_sooner_than_good(
        interval in 1u32..5000,
        repetition in 2u32..50,
        ease in 1.3f64..5.0,
    ) {
        let mut good = card_with(interval, repetition, ease);
        let mut easy = good.clone();
        apply_review(&mut good, Rating::Good, t0());
        apply_review(&mut easy, Rating::Easy, t0());
        prop_assert!(easy.interval >= good.interval);
    }

    #[test]
    fn successful_reviews_count_up(
        ratings in prop::collection::vec(prop::sample::select(vec![Rating::Hard, Rating::Good, Rating::Easy]), 1..30),
    ) {
        let mut card = Card::new("q", "a", t0());
        for (i, r) in ratings.iter().enumerate() {
            apply_review(&mut card, *r, t0());
            prop_assert_eq!(card.repetition as usize, i + 1);
        }
    }
}
