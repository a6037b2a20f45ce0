//! Prompt templates for the condense and answer stages

use std::collections::HashMap;

/// Plain string template with `{name}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    ///
    /// Substitution is single-pass, so placeholder-like text inside a value is
    /// left alone. Placeholders without a value are kept verbatim.
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) if is_identifier(&after[..close]) => {
                    let name = &after[..close];
                    match values.get(name) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push('{');
                            result.push_str(name);
                            result.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                _ => {
                    result.push('{');
                    rest = after;
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render from borrowed `(name, value)` pairs
    #[must_use]
    pub fn render_pairs(&self, pairs: &[(&str, &str)]) -> String {
        let values = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.render(&values)
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_identifier(&after[..close]) => {
                let name = &after[..close];
                if !variables.iter().any(|v| v == name) {
                    variables.push(name.to_string());
                }
                rest = &after[close + 1..];
            }
            _ => rest = after,
        }
    }

    variables
}

const CONDENSE_PROMPT: &str = "Upon reviewing the provided request, could you please identify the essential characteristics of an ideal candidate for this position?
Kindly outline each characteristic and separate each by a comma. If available in the request, include the location and price range at the end of your evaluation.
If the question  does not have any request for a talent simply say 'invalid'.

Request:
{question}
";

const CONDENSE_WITH_HISTORY_PROMPT: &str = "Upon reviewing the provided request, could you please identify the essential characteristics of an ideal candidate for this position?
Kindly outline each characteristic and separate each by a comma. If available in the request, include the location and price range at the end of your evaluation.
If the question  does not have any request for a talent simply say 'invalid'.

Conversation so far:
{chat_history}

Request:
{question}
";

const QA_PROMPT: &str = "You are a helpful AI assistant.
Recommend a talent for the given characteristic.
Also provide the reason for your recommendation.
Output should follow the given format and add line breaks with markdown.
If the question is not related to the context, politely respond that you are tuned to only answer questions that are related to the context.


Input
List of talent information:
{context}
Required characteristics:
{question}

Output
Talent Name:
Description:
Location:
Available for:
Specialist Topics:
Interests:
Price Per Hour:
Reasons for recommendation:

";

/// Labeled lines the answer template asks the model to produce, in order
pub const ANSWER_FIELDS: [&str; 8] = [
    "Talent Name:",
    "Description:",
    "Location:",
    "Available for:",
    "Specialist Topics:",
    "Interests:",
    "Price Per Hour:",
    "Reasons for recommendation:",
];

/// Token the condense stage emits when the request seeks no talent
pub const INVALID_TOKEN: &str = "invalid";

/// Standard RAG prompt templates
pub struct RagPrompts;

impl RagPrompts {
    /// Reduce a request to a comma-separated characteristic list
    #[must_use]
    pub fn condense() -> PromptTemplate {
        PromptTemplate::new(CONDENSE_PROMPT)
    }

    /// Condense variant that also sees earlier exchanges
    #[must_use]
    pub fn condense_with_history() -> PromptTemplate {
        PromptTemplate::new(CONDENSE_WITH_HISTORY_PROMPT)
    }

    /// Structured talent recommendation over retrieved profiles
    #[must_use]
    pub fn answer() -> PromptTemplate {
        PromptTemplate::new(QA_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables() {
        let template = PromptTemplate::new("Hello {name}, you are {age} years old, {name}.");
        assert_eq!(template.variables(), &["name", "age"]);
    }

    #[test]
    fn test_template_render() {
        let template = PromptTemplate::new("Hello {name}!");
        let mut values = HashMap::new();
        values.insert("name".to_string(), "Alice".to_string());
        assert_eq!(template.render(&values), "Hello Alice!");
    }

    #[test]
    fn test_render_is_single_pass() {
        let template = PromptTemplate::new("Q: {question}\nC: {context}");
        let rendered = template.render_pairs(&[("question", "{context}"), ("context", "docs")]);
        assert_eq!(rendered, "Q: {context}\nC: docs");
    }

    #[test]
    fn test_missing_and_non_identifier_braces_kept() {
        let template = PromptTemplate::new("{a} {not valid} {b");
        assert_eq!(template.variables(), &["a"]);
        assert_eq!(template.render_pairs(&[]), "{a} {not valid} {b");
    }

    #[test]
    fn test_condense_template() {
        let template = RagPrompts::condense();
        assert_eq!(template.variables(), &["question"]);

        let prompt = template.render_pairs(&[("question", "Need a DJ City: Perth")]);
        assert!(prompt.ends_with("Request:\nNeed a DJ City: Perth\n"));
        assert!(prompt.contains("simply say 'invalid'"));
    }

    #[test]
    fn test_condense_with_history_template() {
        let template = RagPrompts::condense_with_history();
        assert_eq!(template.variables(), &["chat_history", "question"]);
    }

    #[test]
    fn test_answer_template_lists_all_fields() {
        let template = RagPrompts::answer();
        assert_eq!(template.variables(), &["context", "question"]);

        let prompt = template.render_pairs(&[("context", "profile"), ("question", "singer")]);
        for field in ANSWER_FIELDS {
            assert!(prompt.contains(field), "missing {field}");
        }
    }
}
