//! Closed catalogue of tutorial actions.
//!
//! Model output is never executed. Extracted calls are matched against the
//! names below, their arguments are validated, and only then are they run
//! against the [`Tutorial`].

use crate::interpreter::ActionCall;
use crate::tutorial::{Topic, Tutorial};
use serde::{Deserialize, Serialize};

/// Which prompt and action set the tutorial loop uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The model writes tutorial API calls such as `tutorial.show('setup')`
    #[default]
    Code,
    /// The model answers with JSON tool calls from a catalogue
    Tools,
}

/// Every action name the registry knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionName {
    Show,
    NextStep,
    Help,
    Explain,
    WelcomeTutorial,
    PythonIntroduction,
    ExplainProgrammingConcept,
    SetupEnvironment,
    VerifyEnvironment,
    InstallDjango,
    CreateDjangoProject,
    CreateBlogApp,
    CreatePostModel,
    SetupAdmin,
    CreateBlogViews,
    TestBlog,
}

impl ActionName {
    pub const ALL: [ActionName; 16] = [
        ActionName::Show,
        ActionName::NextStep,
        ActionName::Help,
        ActionName::Explain,
        ActionName::WelcomeTutorial,
        ActionName::PythonIntroduction,
        ActionName::ExplainProgrammingConcept,
        ActionName::SetupEnvironment,
        ActionName::VerifyEnvironment,
        ActionName::InstallDjango,
        ActionName::CreateDjangoProject,
        ActionName::CreateBlogApp,
        ActionName::CreatePostModel,
        ActionName::SetupAdmin,
        ActionName::CreateBlogViews,
        ActionName::TestBlog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::Show => "show",
            ActionName::NextStep => "next_step",
            ActionName::Help => "help",
            ActionName::Explain => "explain",
            ActionName::WelcomeTutorial => "welcome_tutorial",
            ActionName::PythonIntroduction => "python_introduction",
            ActionName::ExplainProgrammingConcept => "explain_programming_concept",
            ActionName::SetupEnvironment => "setup_environment",
            ActionName::VerifyEnvironment => "verify_environment",
            ActionName::InstallDjango => "install_django",
            ActionName::CreateDjangoProject => "create_django_project",
            ActionName::CreateBlogApp => "create_blog_app",
            ActionName::CreatePostModel => "create_post_model",
            ActionName::SetupAdmin => "setup_admin",
            ActionName::CreateBlogViews => "create_blog_views",
            ActionName::TestBlog => "test_blog",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// The parameter this action takes, with whether it is required
    pub fn parameter(&self) -> Option<(&'static str, bool)> {
        match self {
            ActionName::Show => Some(("topic", true)),
            ActionName::Help => Some(("error", false)),
            ActionName::Explain | ActionName::ExplainProgrammingConcept => Some(("concept", true)),
            _ => None,
        }
    }

    /// When the model should pick this action (used in the tool catalogue)
    pub fn description(&self) -> &'static str {
        match self {
            ActionName::Show => "Show tutorial content or a code example by key.",
            ActionName::NextStep => "Suggest the next tutorial step.",
            ActionName::Help => "Give a remediation tip for an error message.",
            ActionName::Explain => "Explain a programming concept in beginner terms.",
            ActionName::WelcomeTutorial => "Always call this first when user says hello, hi, or starts the tutorial. Use when user wants to begin.",
            ActionName::PythonIntroduction => "Call this when user says 'Let's learn Python', 'python basics', 'I'm new to programming', or 'start with python'.",
            ActionName::ExplainProgrammingConcept => "Call this when user asks about specific programming concepts like 'what is a variable', 'explain functions', 'what are loops', etc.",
            ActionName::SetupEnvironment => "Call this when user says 'I'm ready for Django setup', 'let's setup', 'environment setup', or after python_introduction is complete.",
            ActionName::VerifyEnvironment => "Call this when user says 'environment is ready', 'check my setup', or after setup_environment steps are completed.",
            ActionName::InstallDjango => "Call this when user says 'install Django', 'ready for Django', or after verify_environment shows success.",
            ActionName::CreateDjangoProject => "Call this when user says 'create project', 'start project', or after Django is installed.",
            ActionName::CreateBlogApp => "Call this when user says 'create app', 'blog app', or after the project is created.",
            ActionName::CreatePostModel => "Call this when user says 'create model', 'post model', or after the blog app is created.",
            ActionName::SetupAdmin => "Call this when user says 'admin', 'setup admin', or after the Post model is migrated.",
            ActionName::CreateBlogViews => "Call this when user says 'views', 'templates', 'make it beautiful', or after the admin is set up.",
            ActionName::TestBlog => "Call this when user says 'test my blog', 'run the server', 'see it live', or after views are created.",
        }
    }

    /// Topic a lesson tool presents, if it is one
    fn lesson(&self) -> Option<Topic> {
        match self {
            ActionName::WelcomeTutorial => Some(Topic::Welcome),
            ActionName::PythonIntroduction => Some(Topic::PythonBasics),
            ActionName::SetupEnvironment => Some(Topic::Setup),
            ActionName::InstallDjango => Some(Topic::DjangoInstall),
            ActionName::CreateDjangoProject => Some(Topic::CreateProject),
            ActionName::CreateBlogApp => Some(Topic::CreateApp),
            ActionName::CreatePostModel => Some(Topic::Models),
            ActionName::SetupAdmin => Some(Topic::Admin),
            ActionName::CreateBlogViews => Some(Topic::Views),
            ActionName::TestBlog => Some(Topic::Test),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Mode {
    /// Actions the model may call in this mode
    pub fn actions(&self) -> &'static [ActionName] {
        const CODE: &[ActionName] = &[
            ActionName::Show,
            ActionName::NextStep,
            ActionName::Help,
            ActionName::Explain,
        ];
        const TOOLS: &[ActionName] = &[
            ActionName::WelcomeTutorial,
            ActionName::PythonIntroduction,
            ActionName::ExplainProgrammingConcept,
            ActionName::SetupEnvironment,
            ActionName::VerifyEnvironment,
            ActionName::InstallDjango,
            ActionName::CreateDjangoProject,
            ActionName::CreateBlogApp,
            ActionName::CreatePostModel,
            ActionName::SetupAdmin,
            ActionName::CreateBlogViews,
            ActionName::TestBlog,
        ];
        match self {
            Mode::Code => CODE,
            Mode::Tools => TOOLS,
        }
    }

    pub fn allows(&self, name: ActionName) -> bool {
        self.actions().contains(&name)
    }
}

/// Errors raised while turning a call into an action or running it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    Unresolved(String),

    #[error("Invalid arguments for {action}: {reason}")]
    InvalidArguments { action: String, reason: String },
}

/// A resolved, validated action ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Show(String),
    NextStep,
    Help(String),
    Explain(String),
    Lesson(Topic),
    VerifyEnvironment,
}

impl Action {
    /// Resolve a call against the actions available in `mode`
    pub fn resolve(call: &ActionCall, mode: Mode) -> std::result::Result<Self, ActionError> {
        let name = ActionName::from_name(&call.name)
            .filter(|name| mode.allows(*name))
            .ok_or_else(|| ActionError::Unresolved(call.to_string()))?;

        let argument = Self::argument(call, name)?;

        let action = match name {
            ActionName::Show => Action::Show(argument.unwrap_or_default()),
            ActionName::NextStep => Action::NextStep,
            ActionName::Help => Action::Help(argument.unwrap_or_default()),
            ActionName::Explain | ActionName::ExplainProgrammingConcept => {
                Action::Explain(argument.unwrap_or_default())
            }
            ActionName::VerifyEnvironment => Action::VerifyEnvironment,
            other => match other.lesson() {
                Some(topic) => Action::Lesson(topic),
                None => return Err(ActionError::Unresolved(call.to_string())),
            },
        };
        Ok(action)
    }

    /// Validate the argument list against the action's single parameter
    fn argument(
        call: &ActionCall,
        name: ActionName,
    ) -> std::result::Result<Option<String>, ActionError> {
        let invalid = |reason: String| ActionError::InvalidArguments {
            action: name.to_string(),
            reason,
        };

        let Some((param, required)) = name.parameter() else {
            // Zero-argument actions ignore stray arguments the model invents
            return Ok(None);
        };

        if call.arguments.len() > 1 {
            return Err(invalid(format!(
                "expected at most one argument, got {}",
                call.arguments.len()
            )));
        }

        let value = call.arguments.get(param).or_else(|| call.arguments.get(ActionCall::POSITIONAL));
        match value {
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(invalid(format!("'{param}' must be a string, got {other}"))),
            None if call.arguments.len() == 1 => {
                let key = call.arguments.keys().next().cloned().unwrap_or_default();
                Err(invalid(format!("unexpected argument '{key}', expected '{param}'")))
            }
            None if required => Err(invalid(format!("missing argument '{param}'"))),
            None => Ok(None),
        }
    }

    /// Run the action. Every action produces display text.
    pub fn execute(&self, tutorial: &mut Tutorial) -> String {
        match self {
            Action::Show(key) => tutorial.show(key),
            Action::NextStep => tutorial.next_step(),
            Action::Help(error) => tutorial.help(error),
            Action::Explain(concept) => tutorial.explain(concept),
            Action::Lesson(topic) => tutorial.show_topic(*topic),
            Action::VerifyEnvironment => tutorial.verify_environment(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: serde_json::Value) -> ActionCall {
        let arguments = match args {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        ActionCall {
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_resolve_positional_argument() {
        let action = Action::resolve(&call("show", json!({"0": "setup"})), Mode::Code).unwrap();
        assert_eq!(action, Action::Show("setup".to_string()));
    }

    #[test]
    fn test_resolve_named_argument() {
        let action =
            Action::resolve(&call("explain_programming_concept", json!({"concept": "loops"})), Mode::Tools)
                .unwrap();
        assert_eq!(action, Action::Explain("loops".to_string()));
    }

    #[test]
    fn test_resolve_lesson_tool() {
        let action = Action::resolve(&call("welcome_tutorial", json!({})), Mode::Tools).unwrap();
        assert_eq!(action, Action::Lesson(Topic::Welcome));
    }

    #[test]
    fn test_help_argument_optional() {
        let action = Action::resolve(&call("help", json!({})), Mode::Code).unwrap();
        assert_eq!(action, Action::Help(String::new()));
    }

    #[test]
    fn test_unknown_name_unresolved() {
        let err = Action::resolve(&call("delete_everything", json!({})), Mode::Tools).unwrap_err();
        assert!(matches!(err, ActionError::Unresolved(_)));
    }

    #[test]
    fn test_name_from_other_mode_unresolved() {
        let err = Action::resolve(&call("verify_environment", json!({})), Mode::Code).unwrap_err();
        assert_eq!(err, ActionError::Unresolved("verify_environment()".to_string()));
        assert!(Action::resolve(&call("show", json!({"0": "setup"})), Mode::Tools).is_err());
    }

    #[test]
    fn test_missing_required_argument() {
        let err = Action::resolve(&call("show", json!({})), Mode::Code).unwrap_err();
        assert!(matches!(err, ActionError::InvalidArguments { .. }));
        assert!(err.to_string().contains("missing argument 'topic'"));
    }

    #[test]
    fn test_non_string_argument_rejected() {
        let err = Action::resolve(&call("show", json!({"topic": 3})), Mode::Code).unwrap_err();
        assert!(err.to_string().contains("'topic' must be a string"));
    }

    #[test]
    fn test_wrong_argument_name_rejected() {
        let err = Action::resolve(&call("show", json!({"page": "setup"})), Mode::Code).unwrap_err();
        assert!(err.to_string().contains("unexpected argument 'page'"));
    }

    #[test]
    fn test_execute_lesson_moves_cursor() {
        let mut tutorial = Tutorial::new();
        let text = Action::Lesson(Topic::CreateApp).execute(&mut tutorial);
        assert!(text.contains("startapp blog"));
        assert_eq!(tutorial.current(), Topic::CreateApp);
    }

    #[test]
    fn test_mode_action_sets_are_disjoint() {
        for name in Mode::Code.actions() {
            assert!(!Mode::Tools.allows(*name), "{name} in both modes");
        }
        assert_eq!(Mode::Code.actions().len() + Mode::Tools.actions().len(), ActionName::ALL.len());
    }
}
