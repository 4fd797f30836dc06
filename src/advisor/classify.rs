//! Intent classification through the LLM.
//!
//! The model is asked to answer with a numbered category; the first of the
//! digits 1, 2 or 3 in its reply decides. A reply with none of them is chat.

use super::intent::Intent;

const CLASSIFICATION_PROMPT: &str = "\
Classify the intent of the user message below.

A request that names no concrete scent, mood, family or occasion counts as (2) general chat.

Examples:
user_input = I feel down today, recommend a floral perfume to lift my mood -> (1)
user_input = Got any good perfumes? -> (2)
user_input = My living room is white oak with linen curtains, what diffuser fits? -> (3)

Intents: (1) perfume recommendation, (2) general chat, (3) interior-based diffuser recommendation
Answer with the number only.";

pub fn classification_prompt(user_input: &str) -> String {
    format!("user_input: {}\n\n{CLASSIFICATION_PROMPT}", user_input.trim())
}

pub fn parse_intent_reply(reply: &str) -> Intent {
    match reply.chars().find(|c| matches!(*c, '1' | '2' | '3')) {
        Some('1') => Intent::Recommendation,
        Some('3') => Intent::DiffuserRecommendation,
        _ => Intent::Chat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_leads_with_input() {
        let prompt = classification_prompt("  citrus for summer ");
        assert!(prompt.starts_with("user_input: citrus for summer\n"));
        assert!(prompt.ends_with("Answer with the number only."));
    }

    #[test]
    fn digit_selects_intent() {
        assert_eq!(parse_intent_reply("1"), Intent::Recommendation);
        assert_eq!(parse_intent_reply("(3) interior"), Intent::DiffuserRecommendation);
        assert_eq!(parse_intent_reply("2"), Intent::Chat);
    }

    #[test]
    fn first_digit_wins() {
        assert_eq!(parse_intent_reply("(2), not (1)"), Intent::Chat);
        assert_eq!(parse_intent_reply("3 or maybe 1"), Intent::DiffuserRecommendation);
    }

    #[test]
    fn no_digit_is_chat() {
        assert_eq!(parse_intent_reply("I'm not sure"), Intent::Chat);
        assert_eq!(parse_intent_reply(""), Intent::Chat);
        assert_eq!(parse_intent_reply("(5)"), Intent::Chat);
    }
}
