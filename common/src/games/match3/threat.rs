/// What a finished move did to the threat meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatChange {
    Unchanged,
    Raised,
    Lowered { by: u32 },
    /// The threshold was reached; the meter is back at zero.
    Triggered,
}

/// Counts consecutive pure-small moves; reaching the threshold triggers a steal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatCounter {
    value: u32,
    threshold: u32,
}

impl ThreatCounter {
    pub fn new(threshold: u32) -> Self {
        Self {
            value: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn with_value(threshold: u32, value: u32) -> Self {
        let mut counter = Self::new(threshold);
        counter.value = value.min(counter.threshold - 1);
        counter
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// `extra_levels` is the number of cascade levels after the first.
    pub fn record_move(&mut self, pure_small: bool, big_match: bool, extra_levels: u32) -> ThreatChange {
        if pure_small {
            self.value += 1;
            if self.value >= self.threshold {
                self.value = 0;
                return ThreatChange::Triggered;
            }
            return ThreatChange::Raised;
        }

        if big_match || extra_levels > 0 {
            let by = extra_levels.max(1);
            self.value = self.value.saturating_sub(by);
            return ThreatChange::Lowered { by };
        }

        ThreatChange::Unchanged
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}
