/// Identifies which "era" of the session a request was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Re-entrancy guard plus generation counter for one polling loop.
///
/// `try_begin` refuses to start while a request of the current generation is
/// outstanding. `advance` invalidates whatever is in flight (channel switch,
/// filter change); late responses carrying an old generation are rejected by
/// `finish` and must not be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollGuard {
    generation: u64,
    in_flight: bool,
}

impl PollGuard {
    pub fn current(&self) -> Generation {
        Generation(self.generation)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    pub fn advance(&mut self) -> Generation {
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = false;
        self.current()
    }

    pub fn try_begin(&mut self) -> Option<Generation> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(self.current())
    }

    /// Mark `generation`'s request as done. Returns whether its result may be applied.
    pub fn finish(&mut self, generation: Generation) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.in_flight = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::PollGuard;

    #[test]
    fn overlapping_polls_are_refused() {
        let mut guard = PollGuard::default();
        let first = guard.try_begin().expect("first poll starts");
        assert!(guard.try_begin().is_none());
        assert!(guard.finish(first));
        assert!(guard.try_begin().is_some());
    }

    #[test]
    fn advancing_rejects_stale_responses() {
        let mut guard = PollGuard::default();
        let stale = guard.try_begin().expect("poll starts");
        let fresh_gen = guard.advance();
        assert!(!guard.is_in_flight());

        let fresh = guard.try_begin().expect("new generation may poll immediately");
        assert_eq!(fresh, fresh_gen);
        assert!(!guard.finish(stale));
        assert!(guard.is_in_flight(), "stale finish must not release the fresh poll");
        assert!(guard.finish(fresh));
    }

    #[test]
    fn generation_wraps_without_panicking() {
        let mut guard = PollGuard {
            generation: u64::MAX,
            in_flight: false,
        };
        assert_eq!(guard.advance().value(), 0);
    }
}
