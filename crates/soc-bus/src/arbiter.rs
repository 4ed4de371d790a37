use crate::transaction::MasterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    Idle,
    Granted(MasterId),
}

/// Round-robin bus arbiter.
///
/// A grant, once given, is held until [`RoundRobinArbiter::release`] is called for the granted
/// master; arbitration only happens while idle. The search for the next master starts just after
/// the previously granted one, so continuously requesting masters are served in rotation.
#[derive(Debug, Clone)]
pub struct RoundRobinArbiter {
    masters: usize,
    state: ArbiterState,
    last: Option<MasterId>,
}

impl RoundRobinArbiter {
    pub fn new(masters: usize) -> Self {
        Self {
            masters,
            state: ArbiterState::Idle,
            last: None,
        }
    }

    pub fn masters(&self) -> usize {
        self.masters
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn granted(&self) -> Option<MasterId> {
        match self.state {
            ArbiterState::Granted(master) => Some(master),
            ArbiterState::Idle => None,
        }
    }

    /// Run one arbitration step. `pending` reports whether a master has a request waiting.
    ///
    /// While a grant is held this is a no-op that returns the current state.
    pub fn arbitrate(&mut self, pending: impl Fn(MasterId) -> bool) -> ArbiterState {
        if self.state != ArbiterState::Idle || self.masters == 0 {
            return self.state;
        }

        let start = self.last.map_or(0, |m| m.0 + 1);
        let next = (0..self.masters)
            .map(|step| MasterId((start + step) % self.masters))
            .find(|&m| pending(m));

        if let Some(master) = next {
            self.state = ArbiterState::Granted(master);
            self.last = Some(master);
        }
        self.state
    }

    /// Drop the grant held by `master` after its transaction completed.
    pub fn release(&mut self, master: MasterId) {
        debug_assert_eq!(self.state, ArbiterState::Granted(master));
        if self.state == ArbiterState::Granted(master) {
            self.state = ArbiterState::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.state = ArbiterState::Idle;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_without_requests() {
        let mut arb = RoundRobinArbiter::new(3);
        assert_eq!(arb.arbitrate(|_| false), ArbiterState::Idle);
        assert_eq!(arb.granted(), None);
    }

    #[test]
    fn rotates_past_previous_grant() {
        let mut arb = RoundRobinArbiter::new(3);
        let mut order = Vec::new();
        for _ in 0..6 {
            let ArbiterState::Granted(m) = arb.arbitrate(|_| true) else {
                panic!("expected a grant");
            };
            order.push(m.0);
            arb.release(m);
        }
        assert_eq!(order, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn grant_is_sticky_until_release() {
        let mut arb = RoundRobinArbiter::new(2);
        assert_eq!(arb.arbitrate(|m| m.0 == 1), ArbiterState::Granted(MasterId(1)));
        // Master 0 requesting does not steal the bus.
        assert_eq!(arb.arbitrate(|_| true), ArbiterState::Granted(MasterId(1)));
        arb.release(MasterId(1));
        assert_eq!(arb.arbitrate(|_| true), ArbiterState::Granted(MasterId(0)));
    }

    #[test]
    fn skips_idle_masters() {
        let mut arb = RoundRobinArbiter::new(4);
        assert_eq!(arb.arbitrate(|m| m.0 == 2), ArbiterState::Granted(MasterId(2)));
        arb.release(MasterId(2));
        // Search starts at 3, wraps to 0.
        assert_eq!(
            arb.arbitrate(|m| m.0 == 0 || m.0 == 2),
            ArbiterState::Granted(MasterId(0))
        );
    }
}
