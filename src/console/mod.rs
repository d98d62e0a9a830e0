// Console sink: the ordered log of output events for a session

use std::fmt;

/// What an event represents, which decides how it is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    System,
    Result,
    Error,
    Success,
    Input,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::System => "system",
            EventKind::Result => "result",
            EventKind::Error => "error",
            EventKind::Success => "success",
            EventKind::Input => "input",
        };
        write!(f, "{}", name)
    }
}

/// One console message. Never mutated once pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub message: String,
    pub kind: EventKind,
}

impl OutputEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        OutputEvent {
            message: message.into(),
            kind,
        }
    }
}

/// Append-only event log; only [`Console::clear`] removes events
#[derive(Debug, Clone, Default)]
pub struct Console {
    events: Vec<OutputEvent>,
}

impl Console {
    pub fn new() -> Self {
        Console { events: Vec::new() }
    }

    pub fn push(&mut self, kind: EventKind, message: impl Into<String>) {
        self.events.push(OutputEvent::new(kind, message));
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    /// Messages of the Result events, in order
    pub fn results(&self) -> impl Iterator<Item = &str> {
        self.of_kind(EventKind::Result)
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.message.as_str())
    }

    pub fn last(&self) -> Option<&OutputEvent> {
        self.events.last()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_keep_order() {
        let mut console = Console::new();
        console.push(EventKind::System, "start");
        console.push(EventKind::Result, "a");
        console.push(EventKind::Result, "b");
        console.push(EventKind::Success, "done");

        let kinds: Vec<EventKind> = console.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::System,
                EventKind::Result,
                EventKind::Result,
                EventKind::Success
            ]
        );
        assert_eq!(console.results().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(console.last().map(|e| e.message.as_str()), Some("done"));
    }

    #[test]
    fn test_clear() {
        let mut console = Console::new();
        console.push(EventKind::Error, "boom");
        console.clear();
        assert!(console.is_empty());
    }
}
