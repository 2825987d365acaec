//! Turns one model reply into the action calls it asks for.
//!
//! Extraction strategies, tried in order (first hit wins):
//! 1. A fenced code block (```` ```python ````, ```` ```py ```` or bare) holding
//!    call expressions such as `tutorial.show('setup')`, one per line.
//! 2. A bare `tutorial.<name>(...)` call embedded in prose.
//! 3. A structured payload: a JSON object or list of objects (optionally in a
//!    ```` ```json ```` fence), each normalized through ordered key lookups.
//!
//! Nothing matching is not an error, it is [`Interpretation::NoAction`] and
//! the caller shows the raw text. Call expressions are parsed, never
//! evaluated: only string literal arguments are accepted.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

/// A normalized call extracted from model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ActionCall {
    /// Key under which a positional argument is stored
    pub const POSITIONAL: &'static str = "0";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// The only argument, when exactly one was given
    pub fn single_argument(&self) -> Option<&Value> {
        if self.arguments.len() == 1 {
            self.arguments.values().next()
        } else {
            None
        }
    }
}

impl std::fmt::Display for ActionCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
                    other => other.to_string(),
                };
                if key.chars().all(|c| c.is_ascii_digit()) {
                    value
                } else {
                    format!("{key}={value}")
                }
            })
            .collect();
        write!(f, "{}({})", self.name, args.join(", "))
    }
}

/// What a reply asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    Actions(Vec<ActionCall>),
    NoAction,
}

/// The reply had an action shape but its content could not be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    #[error("Malformed structured payload: {0}")]
    MalformedPayload(String),

    #[error("Malformed call expression `{expression}`: {reason}")]
    MalformedCall { expression: String, reason: String },
}

type Extracted = std::result::Result<Option<Vec<ActionCall>>, InterpretError>;

/// Output shapes the interpreter understands, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    FencedCall,
    BareCall,
    StructuredPayload,
}

const STRATEGIES: [Strategy; 3] = [
    Strategy::FencedCall,
    Strategy::BareCall,
    Strategy::StructuredPayload,
];

/// Key paths holding the action name, tried in order
const NAME_PATHS: [&[&str]; 3] = [&["action"], &["function", "name"], &["function_call", "name"]];

/// Key paths holding the argument object, tried in order
const ARGUMENT_PATHS: [&[&str]; 4] = [
    &["parameters"],
    &["arguments"],
    &["function_call", "arguments"],
    &["function", "arguments"],
];

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(python|py)?[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid fence regex")
    })
}

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:tutorial\s*\.\s*)?([A-Za-z_]\w*)\s*\((.*)\)\s*;?$").expect("valid call regex")
    })
}

fn bare_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"tutorial\.(\w+)\(([^)]*)\)").expect("valid bare call regex"))
}

/// Extracts action calls from model replies
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Interpret one assistant reply
    pub fn interpret(&self, text: &str) -> std::result::Result<Interpretation, InterpretError> {
        for strategy in STRATEGIES {
            if let Some(calls) = strategy.extract(text)? {
                debug!("Interpreted reply via {:?}: {} call(s)", strategy, calls.len());
                return Ok(Interpretation::Actions(calls));
            }
        }
        debug!("No action shape found in reply");
        Ok(Interpretation::NoAction)
    }
}

impl Strategy {
    fn extract(&self, text: &str) -> Extracted {
        match self {
            Strategy::FencedCall => Self::fenced_call(text),
            Strategy::BareCall => Self::bare_call(text),
            Strategy::StructuredPayload => Self::structured_payload(text),
        }
    }

    /// First python fence, or unlabeled fence of calls.
    ///
    /// A python fence that does not parse is an error; an unlabeled one is
    /// just not a call block.
    fn fenced_call(text: &str) -> Extracted {
        for caps in fence_regex().captures_iter(text) {
            let body = caps.get(2).map_or("", |m| m.as_str()).trim();
            let labeled = caps.get(1).is_some();
            if body.is_empty() || (!labeled && looks_like_json(body)) {
                continue;
            }

            let parsed = body
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(parse_call_expression)
                .collect::<std::result::Result<Vec<_>, _>>();
            match parsed {
                Ok(calls) if !calls.is_empty() => return Ok(Some(calls)),
                Ok(_) => continue,
                Err(e) if labeled => return Err(e),
                Err(_) => continue,
            }
        }
        Ok(None)
    }

    fn bare_call(text: &str) -> Extracted {
        let Some(caps) = bare_call_regex().captures(text) else {
            return Ok(None);
        };
        let expression = caps.get(0).map_or("", |m| m.as_str());
        let name = caps.get(1).map_or("", |m| m.as_str());
        let args = caps.get(2).map_or("", |m| m.as_str());
        let arguments = parse_arguments(args).map_err(|reason| InterpretError::MalformedCall {
            expression: expression.to_string(),
            reason,
        })?;
        Ok(Some(vec![ActionCall {
            name: name.to_string(),
            arguments,
        }]))
    }

    fn structured_payload(text: &str) -> Extracted {
        let body = strip_json_fence(text);

        let value = if looks_like_json(body) {
            serde_json::from_str::<Value>(body)
                .map_err(|e| InterpretError::MalformedPayload(e.to_string()))?
        } else {
            match extract_json_object(body).and_then(|s| serde_json::from_str::<Value>(s).ok()) {
                Some(value) => value,
                None => return Ok(None),
            }
        };

        let objects = match value {
            Value::Array(items) => items,
            object @ Value::Object(_) => vec![object],
            _ => return Ok(None),
        };

        let calls: Vec<ActionCall> = objects.iter().filter_map(normalize_object).collect();
        let skipped = objects.len() - calls.len();
        if skipped > 0 && !calls.is_empty() {
            debug!("Skipping {} payload element(s) without an action name", skipped);
        }
        Ok((!calls.is_empty()).then_some(calls))
    }
}

/// Turn one structured object into a call, if it names an action
fn normalize_object(object: &Value) -> Option<ActionCall> {
    let name = NAME_PATHS
        .iter()
        .filter_map(|path| lookup(object, path))
        .find_map(|v| v.as_str().map(str::trim).filter(|s| !s.is_empty()))?;

    let arguments = ARGUMENT_PATHS
        .iter()
        .filter_map(|path| lookup(object, path))
        .find_map(argument_object)
        .unwrap_or_default();

    Some(ActionCall {
        name: name.to_string(),
        arguments,
    })
}

/// A non-empty argument object, decoding string-encoded JSON
fn argument_object(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) if !map.is_empty() => Some(map.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) if !map.is_empty() => Some(map),
            _ => None,
        },
        _ => None,
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

fn looks_like_json(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}

fn strip_json_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parse `name(args)` or `tutorial.name(args)`
fn parse_call_expression(expression: &str) -> std::result::Result<ActionCall, InterpretError> {
    let malformed = |reason: String| InterpretError::MalformedCall {
        expression: expression.to_string(),
        reason,
    };

    let caps = call_regex()
        .captures(expression)
        .ok_or_else(|| malformed("not a call expression".to_string()))?;
    let name = caps.get(1).map_or("", |m| m.as_str());
    let args = caps.get(2).map_or("", |m| m.as_str());
    let arguments = parse_arguments(args).map_err(malformed)?;

    Ok(ActionCall {
        name: name.to_string(),
        arguments,
    })
}

/// Parse a comma separated list of string literals, optionally `key=`-prefixed
fn parse_arguments(args: &str) -> std::result::Result<Map<String, Value>, String> {
    let mut arguments = Map::new();
    let mut chars = args.chars().peekable();
    let mut position = 0usize;

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        let key = if first == '\'' || first == '"' {
            let key = position.to_string();
            position += 1;
            key
        } else if first.is_alphabetic() || first == '_' {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            if chars.next() != Some('=') {
                return Err(format!("argument '{ident}' is not a string literal"));
            }
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            ident
        } else {
            return Err(format!("unexpected '{first}' in arguments"));
        };

        let value = parse_string_literal(&mut chars)?;
        if arguments.insert(key.clone(), Value::String(value)).is_some() {
            return Err(format!("argument '{key}' given twice"));
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(format!("expected ',' but found '{c}'")),
        }
    }

    Ok(arguments)
}

fn parse_string_literal(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> std::result::Result<String, String> {
    let quote = match chars.next() {
        Some(q @ ('\'' | '"')) => q,
        Some(c) => return Err(format!("expected a string literal, found '{c}'")),
        None => return Err("expected a string literal".to_string()),
    };

    let mut value = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated string literal".to_string()),
            Some(c) if c == quote => return Ok(value),
            Some('\\') => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some(c) => value.push(c),
                None => return Err("unterminated string literal".to_string()),
            },
            Some(c) => value.push(c),
        }
    }
}

/// Extract the first `{…}` JSON object from a text blob.
/// Handles nested braces properly.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return text.get(start..start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn actions(text: &str) -> Vec<ActionCall> {
        match Interpreter::new().interpret(text).unwrap() {
            Interpretation::Actions(calls) => calls,
            Interpretation::NoAction => panic!("expected actions from {text:?}"),
        }
    }

    #[test]
    fn test_fenced_python_call() {
        let calls = actions("```python\ntutorial.show('setup')\n```");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "show");
        assert_eq!(calls[0].single_argument(), Some(&json!("setup")));
    }

    #[test]
    fn test_fenced_block_inside_prose_with_multiple_calls() {
        let text = "Sure! Here you go:\n\n```py\ntutorial.show(\"models\")\ntutorial.next_step()\n```\nEnjoy.";
        let calls = actions(text);
        assert_eq!(calls, vec![
            ActionCall::new("show").with_argument("0", "models"),
            ActionCall::new("next_step"),
        ]);
    }

    #[test]
    fn test_keyword_argument() {
        let calls = actions("```python\ntutorial.help(error='no such table: blog_post')\n```");
        assert_eq!(calls[0].arguments.get("error"), Some(&json!("no such table: blog_post")));
    }

    #[test]
    fn test_fenced_non_call_is_malformed() {
        let err = Interpreter::new()
            .interpret("```python\nimport os; os.remove('x')\n```")
            .unwrap_err();
        assert!(matches!(err, InterpretError::MalformedCall { .. }));
    }

    #[test]
    fn test_identifier_argument_is_malformed() {
        let err = Interpreter::new()
            .interpret("```python\ntutorial.show(topic)\n```")
            .unwrap_err();
        assert_eq!(
            err,
            InterpretError::MalformedCall {
                expression: "tutorial.show(topic)".to_string(),
                reason: "argument 'topic' is not a string literal".to_string(),
            }
        );
    }

    #[test]
    fn test_unlabeled_fence_of_prose_is_not_a_call() {
        let result = Interpreter::new()
            .interpret("Run this in your terminal:\n```\npython manage.py runserver\n```")
            .unwrap();
        assert_eq!(result, Interpretation::NoAction);
    }

    #[test]
    fn test_bare_call_in_prose() {
        let calls = actions("Let's begin! tutorial.show('welcome') will get you started.");
        assert_eq!(calls, vec![ActionCall::new("show").with_argument("0", "welcome")]);
    }

    #[test]
    fn test_structured_action_payload() {
        let calls = actions(r#"{"action": "welcome_tutorial", "parameters": {}}"#);
        assert_eq!(calls, vec![ActionCall::new("welcome_tutorial")]);
        assert!(calls[0].arguments.is_empty());
    }

    #[test]
    fn test_structured_payload_in_json_fence() {
        let text = "```json\n{\"action\": \"explain_programming_concept\", \"parameters\": {\"concept\": \"loops\"}}\n```";
        let calls = actions(text);
        assert_eq!(calls[0].arguments.get("concept"), Some(&json!("loops")));
    }

    #[test]
    fn test_structured_list_and_nested_shapes() {
        let text = r#"[
            {"function": {"name": "setup_environment", "arguments": "{}"}},
            {"function_call": {"name": "explain_programming_concept", "arguments": {"concept": "list"}}},
            {"function": {"name": "explain_programming_concept", "arguments": "{\"concept\": \"string\"}"}}
        ]"#;
        let calls = actions(text);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], ActionCall::new("setup_environment"));
        assert_eq!(calls[1].arguments.get("concept"), Some(&json!("list")));
        assert_eq!(calls[2].arguments.get("concept"), Some(&json!("string")));
    }

    #[test]
    fn test_name_lookup_order() {
        let calls = actions(r#"{"action": "test_blog", "function": {"name": "setup_admin"}}"#);
        assert_eq!(calls[0].name, "test_blog");
    }

    #[test]
    fn test_empty_parameters_fall_through_to_arguments() {
        let calls = actions(r#"{"action": "show", "parameters": {}, "arguments": {"topic": "admin"}}"#);
        assert_eq!(calls[0].arguments.get("topic"), Some(&json!("admin")));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let calls = actions(r#"I will call the tool now: {"action": "test_blog", "parameters": {}} done"#);
        assert_eq!(calls[0].name, "test_blog");
    }

    #[test]
    fn test_malformed_payload_is_distinct_error() {
        let err = Interpreter::new()
            .interpret(r#"{"action": "welcome_tutorial", "parameters": "#)
            .unwrap_err();
        assert!(matches!(err, InterpretError::MalformedPayload(_)));
    }

    #[test]
    fn test_plain_prose_is_no_action() {
        let result = Interpreter::new()
            .interpret("A blog is a website where you publish posts. Want to build one?")
            .unwrap();
        assert_eq!(result, Interpretation::NoAction);
    }

    #[test]
    fn test_objects_without_names_are_no_action() {
        let result = Interpreter::new().interpret(r#"{"answer": 42}"#).unwrap();
        assert_eq!(result, Interpretation::NoAction);
    }

    #[test]
    fn test_payload_array_keeps_named_elements() {
        let text = r#"[{"note": "thinking"}, {"action": "next_step", "parameters": {}}]"#;
        match Interpreter::new().interpret(text).unwrap() {
            Interpretation::Actions(calls) => assert_eq!(calls, vec![ActionCall::new("next_step")]),
            other => panic!("expected actions, got {other:?}"),
        }
    }

    #[test]
    fn test_call_display() {
        let call = ActionCall::new("help").with_argument("error", "it's broken");
        assert_eq!(call.to_string(), r"help(error='it\'s broken')");
        assert_eq!(ActionCall::new("show").with_argument("0", "setup").to_string(), "show('setup')");
    }

    #[test]
    fn test_extract_json_nested() {
        let text = r#"prefix {"a": {"b": 1}, "c": 2} suffix"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a": {"b": 1}, "c": 2}"#));
    }
}
