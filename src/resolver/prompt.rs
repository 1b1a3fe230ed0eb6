//! Fixed instructions for the live tier.

pub const SYSTEM_PROMPT: &str =
    "You are a concise CS tutor. Return ONLY a JSON object. No prose or code fences.";

pub fn user_prompt(interest: &str, concept: &str) -> String {
    format!(
        "Explain \"{concept}\" to someone who loves \"{interest}\".\n\
         Return ONLY valid JSON with keys:\n\
         - \"analogy\": 2-4 sentences\n\
         - \"steps\": 3-6 short bullet points (array of strings)\n\
         - \"code\": a TypeScript snippet as a string"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_embeds_both_fields_and_keys() {
        let p = user_prompt("Cooking", "Recursion");
        assert!(p.starts_with("Explain \"Recursion\" to someone who loves \"Cooking\"."));
        for key in ["\"analogy\"", "\"steps\"", "\"code\"", "TypeScript"] {
            assert!(p.contains(key), "prompt missing {key}");
        }
    }
}
