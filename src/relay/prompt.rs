//! Prompt assembly for script generation.
//!
//! Two pieces reach the model on every call:
//!
//! ```text
//! history: [user] SYSTEM_INSTRUCTION     — output contract, build order, rules
//! live:    knowledge base dump + request  — see `augmented`
//! ```

/// Output contract for the model, sent as the first (prior) conversation turn.
pub const SYSTEM_INSTRUCTION: &str = include_str!("../../config/prompts/system.md");

const DELIMITER: &str = "---";

/// Build the live turn: the knowledge-base dump, then the user's request
/// verbatim in double quotes, then the closing directive.
pub fn augmented(knowledge: &str, user_prompt: &str) -> String {
    let mut out = String::with_capacity(knowledge.len() + user_prompt.len() + 160);
    out.push_str(DELIMITER);
    out.push_str("\nHERE IS THE KNOWLEDGE BASE. USE ONLY THESE FUNCTIONS AND CONCEPTS:\n");
    out.push_str(knowledge);
    out.push('\n');
    out.push_str(DELIMITER);
    out.push_str("\nHERE IS THE USER'S REQUEST:\n\"");
    out.push_str(user_prompt);
    out.push_str("\"\n");
    out.push_str(DELIMITER);
    out.push_str("\nGENERATE THE SCRIPT:\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_is_not_empty() {
        assert!(SYSTEM_INSTRUCTION.contains("SimPhy"));
        assert!(SYSTEM_INSTRUCTION.contains("World.clearAll()"));
    }

    #[test]
    fn knowledge_precedes_request() {
        let text = augmented("{\n  \"Body\": \"create rigid body\"\n}", "drop a ball");
        let kb = text.find("\"Body\": \"create rigid body\"").unwrap();
        let request = text.find("\"drop a ball\"").unwrap();
        assert!(kb < request);
        assert!(text.trim_end().ends_with("GENERATE THE SCRIPT:"));
    }

    #[test]
    fn user_prompt_is_verbatim() {
        let raw = "  two \"quoted\" balls\nand a spring  ";
        let text = augmented("{}", raw);
        assert!(text.contains(raw));
    }
}
