/// Identifies one roster load. Only the most recent ticket may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Orders asynchronous loads against each other and against local edits.
///
/// Every issued load and every local mutation advances the generation, so a
/// response is applied only when nothing newer has happened since it was
/// requested.
#[derive(Debug, Default)]
pub struct LoadSequencer {
    generation: u64,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn mark_local_change(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_is_current() {
        let mut sequencer = LoadSequencer::new();

        let ticket = sequencer.issue();

        assert!(sequencer.is_current(ticket));
    }

    #[test]
    fn older_ticket_is_stale_after_newer_issue() {
        let mut sequencer = LoadSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn local_change_invalidates_in_flight_load() {
        let mut sequencer = LoadSequencer::new();
        let ticket = sequencer.issue();

        sequencer.mark_local_change();

        assert!(!sequencer.is_current(ticket));
    }
}
