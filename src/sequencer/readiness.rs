/// Tracks whether the current item's picture has finished loading, and
/// whether its audio has already been started for this index.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    ready: bool,
    overridden: bool,
    triggered: bool,
}

impl ReadinessGate {
    /// Close the gate for a newly entered index.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` when this call opened the gate.
    pub fn mark_ready(&mut self) -> bool {
        let opened = !self.ready;
        self.ready = true;
        opened
    }

    /// Open the gate without a loaded picture (explicit user override).
    pub fn force_open(&mut self) -> bool {
        let opened = self.mark_ready();
        if opened {
            self.overridden = true;
        }
        opened
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Grants the first playback for this index once the gate is open.
    /// Later calls return `false` until the next `reset`.
    pub fn claim_playback(&mut self) -> bool {
        if !self.ready || self.triggered {
            return false;
        }
        self.triggered = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_is_claimed_once_per_index() {
        let mut gate = ReadinessGate::default();
        assert!(!gate.claim_playback());
        assert!(gate.mark_ready());
        assert!(!gate.mark_ready());
        assert!(gate.claim_playback());
        assert!(!gate.claim_playback());

        gate.reset();
        assert!(!gate.is_ready());
        gate.mark_ready();
        assert!(gate.claim_playback());
    }

    #[test]
    fn override_is_remembered_until_reset() {
        let mut gate = ReadinessGate::default();
        assert!(gate.force_open());
        assert!(gate.is_overridden());
        gate.reset();
        assert!(!gate.is_overridden());
    }
}
