//! Deterministic short-circuit rules
//!
//! Rules run in order against the normalized message before any embedding or model
//! call. The first match wins and its canned reply is returned as-is.

use crate::config::Persona;

/// How a rule decides whether a normalized message matches
#[derive(Debug, Clone)]
pub enum Matcher {
    /// The whole message equals one of the phrases
    Exact(Vec<String>),
    /// The message contains one of the substrings
    Contains(Vec<String>),
}

impl Matcher {
    fn matches(&self, normalized: &str) -> bool {
        match self {
            Matcher::Exact(phrases) => phrases.iter().any(|p| p == normalized),
            Matcher::Contains(needles) => needles.iter().any(|n| normalized.contains(n.as_str())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub matcher: Matcher,
    pub reply: String,
}

/// The rule that fired and what to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub rule: &'a str,
    pub reply: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct RulePolicy {
    rules: Vec<Rule>,
}

impl RulePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Greeting rule followed by the off-topic deflection rule
    pub fn from_persona(persona: &Persona) -> Self {
        Self::new()
            .with_rule(Rule {
                name: "greeting".into(),
                matcher: Matcher::Exact(persona.greeting_triggers.clone()),
                reply: persona.greeting_reply.clone(),
            })
            .with_rule(Rule {
                name: "deflection".into(),
                matcher: Matcher::Contains(persona.deflection_keywords.clone()),
                reply: persona.deflection_reply.clone(),
            })
    }

    /// Append a rule; it is evaluated after every existing rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First rule matching an already trimmed, lower-cased message
    pub fn evaluate(&self, normalized: &str) -> Option<RuleMatch<'_>> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(normalized))
            .map(|rule| RuleMatch {
                rule: &rule.name,
                reply: &rule.reply,
            })
    }
}

/// Trim and lower-case a message for rule matching
pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::persona::builtin;

    fn policy() -> RulePolicy {
        RulePolicy::from_persona(&Persona::default())
    }

    #[test]
    fn test_greeting_any_case_trimmed() {
        let policy = policy();
        for input in ["hi", "  Hi ", "HELLO", "hey", "Hii"] {
            let matched = policy.evaluate(&normalize(input)).unwrap();
            assert_eq!(matched.rule, "greeting");
            assert_eq!(matched.reply, builtin::GREETING_REPLY);
        }
    }

    #[test]
    fn test_greeting_requires_exact_message() {
        assert!(policy().evaluate(&normalize("hi, what does he do?")).is_none());
    }

    #[test]
    fn test_deflection_on_substring() {
        let policy = policy();
        let matched = policy
            .evaluate(&normalize("What is the capital of France"))
            .unwrap();
        assert_eq!(matched.rule, "deflection");
        assert_eq!(matched.reply, builtin::DEFLECTION_REPLY);

        assert!(policy.evaluate("how's the weather today").is_some());
        assert!(policy.evaluate("who is the prime minister").is_some());
    }

    #[test]
    fn test_coarse_matching_accepts_false_positives() {
        // "president" inside a longer word still deflects
        assert!(policy().evaluate("was he vice-president of the club").is_some());
    }

    #[test]
    fn test_no_match_falls_through() {
        assert!(policy().evaluate("what does lakshay do?").is_none());
        assert!(policy().evaluate("").is_none());
    }

    #[test]
    fn test_rules_evaluate_in_order() {
        let policy = RulePolicy::new()
            .with_rule(Rule {
                name: "first".into(),
                matcher: Matcher::Contains(vec!["rust".into()]),
                reply: "one".into(),
            })
            .with_rule(Rule {
                name: "second".into(),
                matcher: Matcher::Exact(vec!["rust".into()]),
                reply: "two".into(),
            });

        assert_eq!(policy.evaluate("rust").unwrap().rule, "first");
    }
}
