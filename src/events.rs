use std::collections::HashMap;
use std::fmt;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseEnter,
    MouseLeave,
    Scroll,
    Load,
}

impl EventKind {
    /// Whether the event continues to ancestors after the target.
    pub fn bubbles(self) -> bool {
        matches!(self, Self::Click)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Scroll => "scroll",
            Self::Load => "load",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct Listener<A> {
    id: ListenerId,
    action: A,
}

/// Listeners keyed by target and event, in registration order.
#[derive(Debug, Clone)]
pub struct ListenerStore<A> {
    map: HashMap<EventTarget, HashMap<EventKind, Vec<Listener<A>>>>,
    next_id: u64,
}

impl<A> Default for ListenerStore<A> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<A: Clone> ListenerStore<A> {
    pub fn add(&mut self, target: EventTarget, event: EventKind, action: A) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.map
            .entry(target)
            .or_default()
            .entry(event)
            .or_default()
            .push(Listener { id, action });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.map.retain(|_, events| {
            events.retain(|_, listeners| {
                let before = listeners.len();
                listeners.retain(|listener| listener.id != id);
                removed |= before != listeners.len();
                !listeners.is_empty()
            });
            !events.is_empty()
        });
        removed
    }

    pub fn get(&self, target: EventTarget, event: EventKind) -> Vec<A> {
        self.map
            .get(&target)
            .and_then(|events| events.get(&event))
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|listener| listener.action.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, target: EventTarget) -> usize {
        self.map
            .get(&target)
            .map(|events| events.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.map
            .values()
            .flat_map(|events| events.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
