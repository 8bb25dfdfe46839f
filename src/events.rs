// Everything that can wake up the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Periodic timer fired
    Tick,

    // User asked for a refresh right now
    Refresh,

    // Ctrl+C, console "quit", or input closed
    Shutdown,
}

impl Event {
    /// Tick and Refresh both start a reconciliation run.
    pub fn is_trigger(&self) -> bool {
        matches!(self, Event::Tick | Event::Refresh)
    }
}

/// Fold a burst of queued events into the single one worth acting on.
/// Shutdown wins, then Refresh (it also forces a fetch), then Tick.
pub fn coalesce(events: impl IntoIterator<Item = Event>) -> Option<Event> {
    events.into_iter().fold(None, |acc, ev| match (acc, ev) {
        (Some(Event::Shutdown), _) | (_, Event::Shutdown) => Some(Event::Shutdown),
        (Some(Event::Refresh), _) | (_, Event::Refresh) => Some(Event::Refresh),
        _ => Some(Event::Tick),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_trigger() {
        assert!(Event::Tick.is_trigger());
        assert!(Event::Refresh.is_trigger());
        assert!(!Event::Shutdown.is_trigger());
    }

    #[test]
    fn test_coalesce_empty() {
        assert_eq!(coalesce(Vec::new()), None);
    }

    #[test]
    fn test_coalesce_priority() {
        assert_eq!(coalesce([Event::Tick, Event::Tick]), Some(Event::Tick));
        assert_eq!(
            coalesce([Event::Tick, Event::Refresh, Event::Tick]),
            Some(Event::Refresh)
        );
        assert_eq!(
            coalesce([Event::Refresh, Event::Shutdown, Event::Tick]),
            Some(Event::Shutdown)
        );
    }
}
