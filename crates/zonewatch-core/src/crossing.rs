//! Crossing detector: edge-detects verdict transitions across
//! successive position updates.
//!
//! Edge-triggered, not level-triggered: the asset loitering outside
//! the zone produces exactly one `LeftSafe`, however many updates
//! arrive. The only state is the last non-`Unknown` verdict; an
//! `Unknown` reading (signal dropout, disarmed system) never
//! overwrites the memory, so a dropout cannot re-fire an edge that
//! already fired.

use crate::types::{CrossingEvent, ZoneVerdict};

/// Verdict-transition edge detector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrossingDetector {
    previous: ZoneVerdict,
}

impl CrossingDetector {
    /// Fresh detector with `Unknown` memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last non-`Unknown` verdict observed, or `Unknown` after a
    /// reset.
    pub fn previous(&self) -> ZoneVerdict {
        self.previous
    }

    /// Observe the verdict for the latest update, returning the
    /// crossing edge if one fired.
    pub fn observe(&mut self, current: ZoneVerdict) -> Option<CrossingEvent> {
        let event = match current {
            ZoneVerdict::Unknown => None,
            ZoneVerdict::Outside if self.previous != ZoneVerdict::Outside => {
                Some(CrossingEvent::LeftSafe)
            }
            ZoneVerdict::Inside if self.previous != ZoneVerdict::Inside => {
                Some(CrossingEvent::EnteredSafe)
            }
            _ => None,
        };

        if current != ZoneVerdict::Unknown {
            self.previous = current;
        }

        event
    }

    /// Forget the previous verdict. Called on arm, disarm, and
    /// explicit alarm override so stale memory cannot suppress or
    /// fabricate the next edge.
    pub fn reset(&mut self) {
        self.previous = ZoneVerdict::Unknown;
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZoneVerdict::{Inside, Outside, Unknown};

    #[test]
    fn starts_unknown() {
        let detector = CrossingDetector::new();
        assert_eq!(detector.previous(), Unknown);
    }

    #[test]
    fn first_outside_fires_left_safe() {
        let mut detector = CrossingDetector::new();
        assert_eq!(detector.observe(Outside), Some(CrossingEvent::LeftSafe));
    }

    #[test]
    fn first_inside_fires_entered_safe() {
        let mut detector = CrossingDetector::new();
        assert_eq!(detector.observe(Inside), Some(CrossingEvent::EnteredSafe));
    }

    #[test]
    fn repeated_outside_fires_once() {
        let mut detector = CrossingDetector::new();
        let events: Vec<_> = [Outside, Outside, Outside]
            .into_iter()
            .filter_map(|v| detector.observe(v))
            .collect();
        assert_eq!(events, vec![CrossingEvent::LeftSafe]);
    }

    #[test]
    fn inside_outside_inside_fires_three_edges() {
        let mut detector = CrossingDetector::new();
        let events: Vec<_> = [Inside, Outside, Inside]
            .into_iter()
            .filter_map(|v| detector.observe(v))
            .collect();
        assert_eq!(
            events,
            vec![
                CrossingEvent::EnteredSafe,
                CrossingEvent::LeftSafe,
                CrossingEvent::EnteredSafe,
            ]
        );
    }

    #[test]
    fn unknown_fires_nothing_and_keeps_memory() {
        let mut detector = CrossingDetector::new();
        detector.observe(Outside);
        assert_eq!(detector.observe(Unknown), None);
        assert_eq!(detector.previous(), Outside);
    }

    #[test]
    fn dropout_does_not_refire_edge() {
        // Outside, signal lost, Outside again: one LeftSafe total.
        let mut detector = CrossingDetector::new();
        assert_eq!(detector.observe(Outside), Some(CrossingEvent::LeftSafe));
        assert_eq!(detector.observe(Unknown), None);
        assert_eq!(detector.observe(Outside), None);
    }

    #[test]
    fn reset_allows_refire() {
        let mut detector = CrossingDetector::new();
        detector.observe(Outside);
        detector.reset();
        assert_eq!(detector.previous(), Unknown);
        assert_eq!(detector.observe(Outside), Some(CrossingEvent::LeftSafe));
    }

    #[test]
    fn memory_updates_on_suppressed_repeat() {
        let mut detector = CrossingDetector::new();
        detector.observe(Inside);
        detector.observe(Inside);
        assert_eq!(detector.previous(), Inside);
    }
}
