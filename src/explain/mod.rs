//! The data contract shared by the resolver and the presenter.
//!
//! `ExplanationRequest` is what travels over the wire and is deliberately
//! stringly-typed: the server must not assume the client's closed menus.
//! [`Interest`] and [`Concept`] are those closed menus, used by the
//! presenter and the offline generator in [`local`].

pub mod local;
pub mod mock;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Provenance ────────────────────────────────────────────────────────────────

/// Which tier produced an [`Explanation`]. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ai,
    Mock,
    Local,
}

impl Source {
    /// Badge text shown next to the heading.
    pub fn badge(self) -> &'static str {
        match self {
            Source::Ai => "AI",
            Source::Mock => "AI (mock)",
            Source::Local => "Local",
        }
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

/// Body of `POST /api/explain`.
///
/// Both fields default to empty so a missing key deserializes and is then
/// rejected by [`ExplanationRequest::validate`] rather than by serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    #[serde(default)]
    pub interest: String,
    #[serde(default)]
    pub concept: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {0}")]
pub struct MissingField(pub &'static str);

impl ExplanationRequest {
    pub fn new(interest: impl Into<String>, concept: impl Into<String>) -> Self {
        Self { interest: interest.into(), concept: concept.into() }
    }

    /// Reject blank fields. Values outside the closed menus are accepted.
    pub fn validate(&self) -> Result<(), MissingField> {
        if self.interest.trim().is_empty() {
            return Err(MissingField("interest"));
        }
        if self.concept.trim().is_empty() {
            return Err(MissingField("concept"));
        }
        Ok(())
    }
}

impl From<(Interest, Concept)> for ExplanationRequest {
    fn from((interest, concept): (Interest, Concept)) -> Self {
        Self::new(interest.to_string(), concept.to_string())
    }
}

/// A rendered explanation of one concept for one interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub analogy: String,
    pub steps: Vec<String>,
    pub code: String,
    pub source: Source,
}

impl Explanation {
    /// Non-empty analogy and code, at least one step.
    pub fn is_well_formed(&self) -> bool {
        !self.analogy.trim().is_empty() && !self.code.trim().is_empty() && !self.steps.is_empty()
    }
}

// ── Closed menus ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

/// Lowercase and drop separators so `"Hash Map"`, `"hash-map"` and
/// `"HASH_MAP"` compare equal.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    Dance,
    Poetry,
    Cooking,
    Sports,
    Gaming,
    Music,
}

impl Interest {
    pub const ALL: [Interest; 6] = [
        Interest::Dance,
        Interest::Poetry,
        Interest::Cooking,
        Interest::Sports,
        Interest::Gaming,
        Interest::Music,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Interest::Dance => "Dance",
            Interest::Poetry => "Poetry",
            Interest::Cooking => "Cooking",
            Interest::Sports => "Sports",
            Interest::Gaming => "Gaming",
            Interest::Music => "Music",
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interest {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Interest::ALL
            .into_iter()
            .find(|i| normalize(i.name()) == wanted)
            .ok_or_else(|| UnknownChoice { kind: "interest", value: s.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    Stack,
    Queue,
    HashMap,
    BinarySearch,
    Recursion,
    Graph,
}

impl Concept {
    pub const ALL: [Concept; 6] = [
        Concept::Stack,
        Concept::Queue,
        Concept::HashMap,
        Concept::BinarySearch,
        Concept::Recursion,
        Concept::Graph,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Concept::Stack => "Stack",
            Concept::Queue => "Queue",
            Concept::HashMap => "Hash Map",
            Concept::BinarySearch => "Binary Search",
            Concept::Recursion => "Recursion",
            Concept::Graph => "Graph",
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Concept {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Concept::ALL
            .into_iter()
            .find(|c| normalize(c.name()) == wanted)
            .ok_or_else(|| UnknownChoice { kind: "concept", value: s.to_string() })
    }
}
