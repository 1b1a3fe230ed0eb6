//! The two-step pick: interest first, then concept.

use thiserror::Error;

use crate::explain::{Concept, Interest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("pick an interest before choosing a concept")]
    NoInterest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    interest: Option<Interest>,
    concept: Option<Concept>,
}

impl Selection {
    pub fn interest(&self) -> Option<Interest> {
        self.interest
    }

    pub fn concept(&self) -> Option<Concept> {
        self.concept
    }

    /// Choosing an interest always clears the concept.
    pub fn pick_interest(&mut self, interest: Interest) {
        self.interest = Some(interest);
        self.concept = None;
    }

    pub fn pick_concept(&mut self, concept: Concept) -> Result<(), SelectionError> {
        if self.interest.is_none() {
            return Err(SelectionError::NoInterest);
        }
        self.concept = Some(concept);
        Ok(())
    }

    /// The pair to request, once both halves are chosen.
    pub fn request(&self) -> Option<(Interest, Concept)> {
        self.interest.zip(self.concept)
    }
}
