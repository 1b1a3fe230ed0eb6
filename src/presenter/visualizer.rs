//! Toy Stack/Queue model behind the Push/Pop and Enqueue/Dequeue buttons.

use std::collections::VecDeque;
use std::fmt::Write as _;

use crate::explain::{Concept, Interest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Stack,
    Queue,
}

impl VisualKind {
    /// Only Stack and Queue have a visual.
    pub fn for_concept(concept: Concept) -> Option<Self> {
        match concept {
            Concept::Stack => Some(VisualKind::Stack),
            Concept::Queue => Some(VisualKind::Queue),
            _ => None,
        }
    }

    pub fn push_label(self) -> &'static str {
        match self {
            VisualKind::Stack => "Push",
            VisualKind::Queue => "Enqueue",
        }
    }

    pub fn pop_label(self) -> &'static str {
        match self {
            VisualKind::Stack => "Pop",
            VisualKind::Queue => "Dequeue",
        }
    }

    pub fn head_label(self) -> &'static str {
        match self {
            VisualKind::Stack => "Top →",
            VisualKind::Queue => "Front →",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            VisualKind::Stack => "Try the buttons to see LIFO in action.",
            VisualKind::Queue => "Try the buttons to see FIFO in action.",
        }
    }
}

/// Four demo labels for an interest, e.g. `"Move A".."Move D"`.
pub fn demo_items(interest: Option<Interest>) -> [String; 4] {
    let base = match interest {
        None => "Item",
        Some(Interest::Dance) => "Move",
        Some(Interest::Poetry) => "Line",
        Some(Interest::Cooking) => "Step",
        Some(Interest::Sports) => "Play",
        Some(Interest::Gaming) => "Action",
        Some(Interest::Music) => "Bar",
    };
    ["A", "B", "C", "D"].map(|s| format!("{base} {s}"))
}

#[derive(Debug, Clone)]
pub struct Visualizer {
    kind: VisualKind,
    demo: [String; 4],
    items: VecDeque<String>,
}

impl Visualizer {
    pub fn new(kind: VisualKind, interest: Option<Interest>) -> Self {
        Self { kind, demo: demo_items(interest), items: VecDeque::new() }
    }

    pub fn kind(&self) -> VisualKind {
        self.kind
    }

    /// Append the next demo label, cycling through the four.
    pub fn push(&mut self) -> &str {
        let label = self.demo[self.items.len() % self.demo.len()].clone();
        self.items.push_back(label);
        self.items.back().map(String::as_str).unwrap_or_default()
    }

    /// Stack removes the newest item, Queue the oldest.
    pub fn pop(&mut self) -> Option<String> {
        match self.kind {
            VisualKind::Stack => self.items.pop_back(),
            VisualKind::Queue => self.items.pop_front(),
        }
    }

    pub fn can_pop(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn reset(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One-line text frame: `Top → [Bar A] [Bar B]   size: 2`.
    pub fn render(&self) -> String {
        let mut out = String::from(self.kind.head_label());
        for item in &self.items {
            let _ = write!(out, " [{item}]");
        }
        let _ = write!(out, "   size: {}", self.items.len());
        out
    }
}
