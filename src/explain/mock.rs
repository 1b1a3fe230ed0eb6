//! Canned explanation served when the live model is disabled.
//!
//! Deterministic in the request fields alone, so repeated requests for the
//! same pair are byte-identical even before the cache is consulted.

use super::{Explanation, ExplanationRequest, Source};

pub fn mock_explain(req: &ExplanationRequest) -> Explanation {
    let interest = req.interest.trim();
    let concept = req.concept.trim();
    Explanation {
        analogy: format!("({interest}) {concept} explained (mock)."),
        steps: vec!["Step one".into(), "Step two".into(), "Step three".into()],
        code: format!("// mock {concept}\nconsole.log('hello');"),
        source: Source::Mock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_concept_and_mock() {
        let e = mock_explain(&ExplanationRequest::new("Music", "Stack"));
        assert_eq!(e.source, Source::Mock);
        assert_eq!(e.analogy, "(Music) Stack explained (mock).");
        assert!(e.code.contains("mock"));
        assert!(e.code.contains("Stack"));
        assert_eq!(e.steps.len(), 3);
    }

    #[test]
    fn deterministic() {
        let req = ExplanationRequest::new("Poetry", "Graph");
        assert_eq!(mock_explain(&req), mock_explain(&req));
    }
}
