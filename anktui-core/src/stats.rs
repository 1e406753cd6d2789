use crate::Card;

/// Partition of a card set by learning stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetentionStats {
    pub total: usize,
    pub new: usize,
    pub young: usize,
    pub mature: usize,
}

impl RetentionStats {
    pub fn record(&mut self, card: &Card) {
        self.total += 1;
        if card.is_new() {
            self.new += 1;
        } else if card.is_mature() {
            self.mature += 1;
        } else {
            self.young += 1;
        }
    }

    pub fn merge(&mut self, other: &RetentionStats) {
        self.total += other.total;
        self.new += other.new;
        self.young += other.young;
        self.mature += other.mature;
    }

    /// Share of reviewed cards that are mature.
    pub fn mature_ratio(&self) -> f64 {
        let reviewed = self.young + self.mature;
        if reviewed == 0 {
            0.0
        } else {
            self.mature as f64 / reviewed as f64
        }
    }
}

pub fn retention_stats(cards: &[Card]) -> RetentionStats {
    let mut stats = RetentionStats::default();
    for c in cards {
        stats.record(c);
    }
    stats
}
