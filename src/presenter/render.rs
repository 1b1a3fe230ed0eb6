//! Plain-text rendering of a [`Presentation`] for the terminal client.

use std::fmt::Write as _;

use super::Presentation;

pub fn render(p: &Presentation) -> String {
    let e = &p.explanation;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} explained for {}  [{}]",
        p.concept,
        p.interest.name().to_lowercase(),
        e.source.badge()
    );
    if let Some(notice) = &p.notice {
        let _ = writeln!(out, "! {notice}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", e.analogy);
    let _ = writeln!(out);
    for step in &e.steps {
        let _ = writeln!(out, "  • {step}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Code (TypeScript)");
    for line in e.code.lines() {
        let _ = writeln!(out, "    {line}");
    }
    out
}
