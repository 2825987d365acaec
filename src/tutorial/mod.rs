//! Tutorial registry
//!
//! Serves lesson content by topic, tracks where the learner is, and answers
//! error and concept questions. Every answer is markdown ready for display.

pub mod content;
mod probe;

pub use probe::{Probe, ProbeOutput, SystemProbe};

use std::collections::BTreeSet;
use tracing::debug;

/// A lesson in the linear tutorial flow, declared in flow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Welcome,
    PythonBasics,
    Setup,
    DjangoInstall,
    CreateProject,
    CreateApp,
    Models,
    Admin,
    Views,
    Test,
}

impl Topic {
    /// All topics in the order the tutorial walks through them
    pub const FLOW: [Topic; 10] = [
        Topic::Welcome,
        Topic::PythonBasics,
        Topic::Setup,
        Topic::DjangoInstall,
        Topic::CreateProject,
        Topic::CreateApp,
        Topic::Models,
        Topic::Admin,
        Topic::Views,
        Topic::Test,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Topic::Welcome => "welcome",
            Topic::PythonBasics => "python_basics",
            Topic::Setup => "setup",
            Topic::DjangoInstall => "django_install",
            Topic::CreateProject => "create_project",
            Topic::CreateApp => "create_app",
            Topic::Models => "models",
            Topic::Admin => "admin",
            Topic::Views => "views",
            Topic::Test => "test",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::FLOW.into_iter().find(|t| t.key() == key)
    }

    pub fn content(&self) -> &'static str {
        match self {
            Topic::Welcome => content::WELCOME,
            Topic::PythonBasics => content::PYTHON_BASICS,
            Topic::Setup => content::SETUP,
            Topic::DjangoInstall => content::DJANGO_INSTALL,
            Topic::CreateProject => content::CREATE_PROJECT,
            Topic::CreateApp => content::CREATE_APP,
            Topic::Models => content::MODELS,
            Topic::Admin => content::ADMIN,
            Topic::Views => content::VIEWS,
            Topic::Test => content::TEST,
        }
    }

    /// The topic after this one, if any
    pub fn next(&self) -> Option<Topic> {
        let idx = Self::FLOW.iter().position(|t| t == self)?;
        Self::FLOW.get(idx + 1).copied()
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A code example. Showing one never moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeExample {
    Models,
    Views,
    Urls,
    Template,
    Admin,
}

impl CodeExample {
    pub const ALL: [CodeExample; 5] = [
        CodeExample::Models,
        CodeExample::Views,
        CodeExample::Urls,
        CodeExample::Template,
        CodeExample::Admin,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CodeExample::Models => "models_code",
            CodeExample::Views => "views_code",
            CodeExample::Urls => "urls_code",
            CodeExample::Template => "template_code",
            CodeExample::Admin => "admin_code",
        }
    }

    /// Resolve `<name>_code`, or a bare `<name>` when no topic owns it
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| {
            c.key() == key || (Topic::from_key(key).is_none() && c.key().strip_suffix("_code") == Some(key))
        })
    }

    fn language(&self) -> &'static str {
        match self {
            CodeExample::Template => "html",
            _ => "python",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            CodeExample::Models => content::MODELS_CODE,
            CodeExample::Views => content::VIEWS_CODE,
            CodeExample::Urls => content::URLS_CODE,
            CodeExample::Template => content::TEMPLATE_CODE,
            CodeExample::Admin => content::ADMIN_CODE,
        }
    }

    /// The example as a fenced markdown code block
    pub fn fenced(&self) -> String {
        format!("```{}\n{}\n```", self.language(), self.source())
    }
}

/// Concept explanations, matched in this order
const CONCEPTS: [(&str, &str); 6] = [
    ("variable", content::VARIABLE),
    ("function", content::FUNCTION),
    ("loop", content::LOOP),
    ("list", content::LIST),
    ("string", content::STRING),
    ("error", content::ERROR),
];

/// Error remediation tips, first matching pattern group wins
const HELP_TIPS: [(&[&str], &str); 3] = [
    (&["django not found", "no module"], content::HELP_VIRTUALENV),
    (&["no such table"], content::HELP_MIGRATIONS),
    (&["template"], content::HELP_TEMPLATE),
];

/// Per-session tutorial state: the cursor and the set of visited topics
pub struct Tutorial {
    current: Topic,
    visited: BTreeSet<Topic>,
    probe: Box<dyn Probe + Send>,
}

impl Tutorial {
    /// Create a tutorial positioned at the welcome topic
    pub fn new() -> Self {
        Self::with_probe(SystemProbe)
    }

    /// Create a tutorial whose environment check uses the given probe
    pub fn with_probe(probe: impl Probe + Send + 'static) -> Self {
        Self {
            current: Topic::Welcome,
            visited: BTreeSet::new(),
            probe: Box::new(probe),
        }
    }

    /// Topic the cursor points at
    pub fn current(&self) -> Topic {
        self.current
    }

    /// Topics the learner has moved past or re-entered
    pub fn visited(&self) -> &BTreeSet<Topic> {
        &self.visited
    }

    pub fn is_visited(&self, topic: Topic) -> bool {
        self.visited.contains(&topic)
    }

    /// Show a topic or a code example.
    ///
    /// A topic marks the current one visited and moves the cursor. A code
    /// example leaves the cursor alone. Unknown keys get the listing of
    /// everything that can be shown.
    pub fn show(&mut self, key: &str) -> String {
        let key = key.trim();
        if let Some(topic) = Topic::from_key(key) {
            return self.show_topic(topic);
        }
        if let Some(example) = CodeExample::from_key(key) {
            return example.fenced();
        }

        debug!("Unknown tutorial key '{}', listing topics", key);
        Self::listing()
    }

    /// Move the cursor to a topic and return its content
    pub fn show_topic(&mut self, topic: Topic) -> String {
        self.visited.insert(self.current);
        self.current = topic;
        topic.content().to_string()
    }

    /// Suggest the topic after the cursor, or congratulate at the end
    pub fn next_step(&self) -> String {
        match self.current.next() {
            Some(next) => format!("Ready for the next step? Type: tutorial.show('{next}')"),
            None => content::TUTORIAL_COMPLETE.to_string(),
        }
    }

    /// Remediation tip for an error message
    pub fn help(&self, error: &str) -> String {
        let error = error.to_lowercase();
        HELP_TIPS
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|p| error.contains(p)))
            .map(|(_, tip)| tip.to_string())
            .unwrap_or_else(|| content::HELP_GENERIC.to_string())
    }

    /// Beginner explanation of a programming concept
    pub fn explain(&self, concept: &str) -> String {
        let concept = concept.to_lowercase();
        CONCEPTS
            .iter()
            .find(|(key, _)| concept.contains(key))
            .map(|(_, text)| text.to_string())
            .unwrap_or_else(|| content::CONCEPT_LISTING.to_string())
    }

    /// Check Python, the virtual environment and pip on the learner's machine
    pub fn verify_environment(&self) -> String {
        let mut python = self.probe.run("python3", &["--version"]);
        if !python.success {
            python = self.probe.run("python", &["--version"]);
        }
        let venv_active = self.probe.env_var("VIRTUAL_ENV").is_some();
        let pip = self.probe.run("pip", &["--version"]);

        debug!(
            "environment check: python={}, venv={}, pip={}",
            python.success, venv_active, pip.success
        );

        let mut report = String::from("🔍 **Environment Check Results:**\n\n");

        if python.success {
            report.push_str(&format!("✅ Python is installed: {}\n", python.output.trim()));
        } else {
            report.push_str("❌ Python not found. Please install Python from python.org\n");
        }

        if venv_active {
            report.push_str("✅ Virtual environment is active - great job!\n");
        } else {
            report.push_str("⚠️  Virtual environment not active. Run the activation command again:\n");
            report.push_str("   Mac/Linux: `source blog_env/bin/activate`\n");
            report.push_str("   Windows: `blog_env\\Scripts\\activate`\n");
        }

        if pip.success {
            report.push_str("✅ Pip is available for installing packages\n");
        } else {
            report.push_str(
                "❌ Pip not found. This usually fixes itself when virtual environment is active.\n",
            );
        }

        if python.success && venv_active && pip.success {
            report.push_str("\n🎉 **Everything looks great! Ready to install Django!**\n");
            report.push_str("\nSay **'install Django'** to continue!");
        } else {
            report.push_str("\n🔧 Please fix the issues above before continuing. Need help? Just ask!");
        }

        report
    }

    fn listing() -> String {
        let topics: Vec<&str> = Topic::FLOW.iter().map(|t| t.key()).collect();
        let examples: Vec<&str> = CodeExample::ALL.iter().map(|c| c.key()).collect();
        format!(
            "Available topics: {}\nCode examples: {}",
            topics.join(", "),
            examples.join(", ")
        )
    }
}

impl Default for Tutorial {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct FakeProbe {
        programs: HashMap<&'static str, &'static str>,
        virtual_env: bool,
    }

    impl Probe for FakeProbe {
        fn run(&self, program: &str, _args: &[&str]) -> ProbeOutput {
            match self.programs.get(program) {
                Some(out) => ProbeOutput {
                    success: true,
                    output: format!("{out}\n"),
                },
                None => ProbeOutput::failed("not found"),
            }
        }

        fn env_var(&self, name: &str) -> Option<String> {
            (name == "VIRTUAL_ENV" && self.virtual_env).then(|| "/tmp/blog_env".to_string())
        }
    }

    #[test]
    fn test_show_topic_moves_cursor() {
        let mut tutorial = Tutorial::new();
        let text = tutorial.show("setup");
        assert_eq!(text, content::SETUP);
        assert_eq!(tutorial.current(), Topic::Setup);
        assert!(tutorial.is_visited(Topic::Welcome));
        assert!(!tutorial.is_visited(Topic::Setup));
    }

    #[test]
    fn test_show_is_idempotent_on_content() {
        let mut tutorial = Tutorial::new();
        let first = tutorial.show("models");
        let second = tutorial.show("models");
        assert_eq!(first, second);
        assert!(tutorial.is_visited(Topic::Models));
    }

    #[test]
    fn test_show_code_example_keeps_cursor() {
        let mut tutorial = Tutorial::new();
        tutorial.show("admin");
        let code = tutorial.show("models_code");
        assert!(code.starts_with("```python\nfrom django.db import models"));
        assert!(code.ends_with("\n```"));
        assert_eq!(tutorial.current(), Topic::Admin);
    }

    #[test]
    fn test_bare_example_name_only_when_no_topic_collides() {
        let mut tutorial = Tutorial::new();
        assert!(tutorial.show("template").starts_with("```html"));
        // "models" is a topic, not the models example
        assert_eq!(tutorial.show("models"), content::MODELS);
    }

    #[test]
    fn test_unknown_key_lists_topics() {
        let mut tutorial = Tutorial::new();
        let text = tutorial.show("deployment");
        assert!(text.starts_with("Available topics: welcome, python_basics"));
        assert!(text.contains("Code examples: models_code"));
        assert_eq!(tutorial.current(), Topic::Welcome);
        assert!(tutorial.visited().is_empty());
    }

    #[test]
    fn test_next_step_suggests_following_topic() {
        let mut tutorial = Tutorial::new();
        assert_eq!(
            tutorial.next_step(),
            "Ready for the next step? Type: tutorial.show('python_basics')"
        );
        tutorial.show("create_app");
        assert_eq!(
            tutorial.next_step(),
            "Ready for the next step? Type: tutorial.show('models')"
        );
    }

    #[test]
    fn test_next_step_at_final_topic_completes() {
        let mut tutorial = Tutorial::new();
        tutorial.show("test");
        assert_eq!(tutorial.next_step(), content::TUTORIAL_COMPLETE);
    }

    #[test]
    fn test_help_matches_in_order() {
        let tutorial = Tutorial::new();
        assert_eq!(tutorial.help("ModuleNotFoundError: No module named 'django'"), content::HELP_VIRTUALENV);
        assert_eq!(tutorial.help("OperationalError: no such table: blog_post"), content::HELP_MIGRATIONS);
        assert_eq!(tutorial.help("something about No Such Table here"), content::HELP_MIGRATIONS);
        assert_eq!(tutorial.help("TemplateDoesNotExist"), content::HELP_TEMPLATE);
        assert_eq!(tutorial.help("it just broke"), content::HELP_GENERIC);
    }

    #[test]
    fn test_explain_first_match_wins() {
        let tutorial = Tutorial::new();
        assert_eq!(tutorial.explain("What's a VARIABLE?"), content::VARIABLE);
        assert_eq!(tutorial.explain("how do loops work"), content::LOOP);
        // "function" is checked before "list"
        assert_eq!(tutorial.explain("functions that return a list"), content::FUNCTION);
        assert_eq!(tutorial.explain("classes"), content::CONCEPT_LISTING);
    }

    #[test]
    fn test_verify_environment_all_good() {
        let tutorial = Tutorial::with_probe(FakeProbe {
            programs: HashMap::from([("python3", "Python 3.12.1"), ("pip", "pip 24.0")]),
            virtual_env: true,
        });
        let report = tutorial.verify_environment();
        assert!(report.contains("✅ Python is installed: Python 3.12.1\n"));
        assert!(report.contains("✅ Virtual environment is active"));
        assert!(report.contains("✅ Pip is available"));
        assert!(report.contains("Ready to install Django!"));
    }

    #[test]
    fn test_verify_environment_falls_back_to_python() {
        let tutorial = Tutorial::with_probe(FakeProbe {
            programs: HashMap::from([("python", "Python 3.11.0")]),
            virtual_env: false,
        });
        let report = tutorial.verify_environment();
        assert!(report.contains("✅ Python is installed: Python 3.11.0"));
        assert!(report.contains("⚠️  Virtual environment not active"));
        assert!(report.contains("❌ Pip not found"));
        assert!(report.ends_with("Need help? Just ask!"));
    }

    #[test]
    fn test_verify_environment_nothing_installed() {
        let tutorial = Tutorial::with_probe(FakeProbe {
            programs: HashMap::new(),
            virtual_env: false,
        });
        let report = tutorial.verify_environment();
        assert!(report.contains("❌ Python not found"));
    }
}
