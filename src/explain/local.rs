//! Offline explanation generator — the presenter's last resort.
//!
//! Pure and total over `Interest × Concept`: no I/O, no failure. Each interest
//! contributes a small vocabulary ([`Flavor`]) that is spliced into a
//! per-concept template. The `match` in [`local_explain`] is exhaustive, so a
//! new [`Concept`] variant without a template does not compile.

use super::{Concept, Explanation, Interest, Source};

/// Interest-specific words used by the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flavor {
    /// A single unit ("move", "line", …).
    pub item: &'static str,
    /// Where units are arranged ("routine", "stanza", …).
    pub place: &'static str,
    /// A collection of participants ("dancers", "poems", …).
    pub group: &'static str,
}

pub fn flavor(interest: Interest) -> Flavor {
    let (item, place, group) = match interest {
        Interest::Dance => ("move", "routine", "dancers"),
        Interest::Poetry => ("line", "stanza", "poems"),
        Interest::Cooking => ("step", "recipe", "ingredients"),
        Interest::Sports => ("play", "playbook", "players"),
        Interest::Gaming => ("action", "combo", "NPCs"),
        Interest::Music => ("bar", "setlist", "musicians"),
    };
    Flavor { item, place, group }
}

pub fn local_explain(interest: Interest, concept: Concept) -> Explanation {
    let f = flavor(interest);
    let (analogy, steps, code) = match concept {
        Concept::Stack => stack(f),
        Concept::Queue => queue(f),
        Concept::HashMap => hash_map(f),
        Concept::BinarySearch => binary_search(),
        Concept::Recursion => recursion(f),
        Concept::Graph => graph(f),
    };
    Explanation { analogy, steps, code, source: Source::Local }
}

type Parts = (String, Vec<String>, String);

fn stack(f: Flavor) -> Parts {
    let Flavor { item, place, .. } = f;
    (
        format!(
            "A Stack is like building a {place}: add each {item} on top; \
             the last added comes off first (LIFO)."
        ),
        vec![
            format!("Push: add a {item} to the top."),
            "Top points to the most recent item.".into(),
            format!("Pop: remove the top {item} first."),
            "Great for undo/back navigation.".into(),
        ],
        format!(
            "const stack: string[] = [];\n\
             stack.push(\"{item} A\");\n\
             stack.push(\"{item} B\");\n\
             console.log(stack.pop()); // {item} B\n\
             console.log(stack.pop()); // {item} A"
        ),
    )
}

fn queue(f: Flavor) -> Parts {
    (
        format!("A Queue is like {} lining up: first in is first out (FIFO).", f.group),
        vec![
            "Enqueue to back".into(),
            "Dequeue from front".into(),
            "Used in scheduling/BFS".into(),
        ],
        "const q: string[] = [];\n\
         q.push(\"first\");\n\
         q.push(\"second\");\n\
         console.log(q.shift()); // first"
            .into(),
    )
}

fn hash_map(f: Flavor) -> Parts {
    (
        format!("Hash Map is labeled bins for your {}: find items by label fast.", f.place),
        vec![
            "Hash key → bucket index".into(),
            "Handle collisions".into(),
            "Avg O(1) get/set".into(),
        ],
        "const m = new Map<string, number>();\n\
         m.set(\"tempo\", 120);\n\
         console.log(m.get(\"tempo\")); // 120"
            .into(),
    )
}

// Same for every interest.
fn binary_search() -> Parts {
    (
        "Like guessing BPM by halving ranges: check middle, discard half.".into(),
        vec![
            "Needs sorted array".into(),
            "Pick middle & compare".into(),
            "Keep the half that can contain target".into(),
        ],
        "function bsearch(a: number[], x: number) {\n  \
         let l = 0, r = a.length - 1;\n  \
         while (l <= r) {\n    \
         const mid = (l + r) >> 1;\n    \
         if (a[mid] === x) return mid;\n    \
         if (a[mid] < x) l = mid + 1; else r = mid - 1;\n  \
         }\n  \
         return -1;\n\
         }"
            .into(),
    )
}

fn recursion(f: Flavor) -> Parts {
    (
        format!(
            "Recurring motif in a {}: each call solves a smaller version until base case.",
            f.place
        ),
        vec![
            "Define base case".into(),
            "Progress toward base".into(),
            "Let recursion solve subproblems".into(),
        ],
        "function factorial(n: number): number {\n  \
         if (n <= 1) return 1;\n  \
         return n * factorial(n - 1);\n\
         }"
            .into(),
    )
}

fn graph(f: Flavor) -> Parts {
    (
        format!("Graph connects {} via edges; explore paths/communities.", f.group),
        vec![
            "Nodes + edges".into(),
            "DFS vs BFS".into(),
            "Used in maps/social/dependencies".into(),
        ],
        "const g: Record<string, string[]> = { A:[\"B\",\"C\"], B:[\"D\"], C:[\"D\"], D:[] };\n\
         function bfs(start: string) {\n  \
         const q = [start], seen = new Set([start]);\n  \
         while (q.length) {\n    \
         const v = q.shift()!;\n    \
         for (const n of g[v]) if (!seen.has(n)) { seen.add(n); q.push(n); }\n  \
         }\n  \
         return [...seen];\n\
         }"
            .into(),
    )
}
