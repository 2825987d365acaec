//! End-to-end tests for the tutorial and chat loops

use django_girls_offline::{
    BlockRole, ChatModel, ChatSession, Console, History, InputLine, Message, Mode, Probe,
    ProbeOutput, Prompt, Role, SessionEnd, TerminalConsole, Topic, TutorConfig, TutorError,
    TutorSession, Tutorial,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::io::BufReader;

/// Model that answers every request with the next canned reply
struct CannedModel {
    replies: Mutex<VecDeque<String>>,
}

impl CannedModel {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        }
    }
}

impl ChatModel for CannedModel {
    async fn complete(&self, _history: &[Message]) -> django_girls_offline::Result<String> {
        let next = self.replies.lock().unwrap().pop_front();
        next.ok_or_else(|| TutorError::Completion("model went away".to_string()))
    }
}

/// Console that replays input and keeps what was shown
#[derive(Default)]
struct ScriptConsole {
    inputs: VecDeque<String>,
    blocks: Vec<(BlockRole, String)>,
}

impl ScriptConsole {
    fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Console for ScriptConsole {
    async fn read_line(&mut self, _prompt: Prompt) -> django_girls_offline::Result<InputLine> {
        Ok(self
            .inputs
            .pop_front()
            .map(InputLine::Line)
            .unwrap_or(InputLine::Closed))
    }

    fn render(&mut self, role: BlockRole, text: &str) -> django_girls_offline::Result<()> {
        self.blocks.push((role, text.to_string()));
        Ok(())
    }

    fn notice(&mut self, _text: &str) -> django_girls_offline::Result<()> {
        Ok(())
    }

    fn write_fragment(&mut self, _text: &str) -> django_girls_offline::Result<()> {
        Ok(())
    }
}

/// A machine with Python and pip but no active virtual environment
struct NoVenvProbe;

impl Probe for NoVenvProbe {
    fn run(&self, program: &str, _args: &[&str]) -> ProbeOutput {
        match program {
            "python3" => ProbeOutput {
                success: true,
                output: "Python 3.12.1".to_string(),
            },
            "pip" => ProbeOutput {
                success: true,
                output: "pip 24.0".to_string(),
            },
            _ => ProbeOutput::failed("not found"),
        }
    }

    fn env_var(&self, _name: &str) -> Option<String> {
        None
    }
}

/// "hello" leads to the welcome lesson and a short acknowledgment in history
#[tokio::test]
async fn test_hello_scenario() {
    let model = CannedModel::new(&["Sure!\n```python\ntutorial.show('welcome')\n```"]);
    let mut session = TutorSession::new(model, ScriptConsole::new(&["hello", "/exit"]), Tutorial::new(), Mode::Code);

    assert_eq!(session.run().await.unwrap(), SessionEnd::Quit);

    let blocks = &session.console().blocks;
    assert_eq!(blocks[0], (BlockRole::Assistant, Topic::Welcome.content().to_string()));
    assert_eq!(blocks[1], (BlockRole::System, "Goodbye.".to_string()));

    let roles: Vec<Role> = session.history().messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    let ack = &session.history().messages()[2].content;
    assert!(ack.starts_with("I called: tutorial.show('welcome')"));
    assert!(!ack.contains("Welcome to Django Girls"));

    assert_eq!(session.tutorial().current(), Topic::Welcome);
    assert!(session.tutorial().is_visited(Topic::Welcome));
}

/// Prose with no call shape is shown and remembered verbatim
#[tokio::test]
async fn test_gibberish_scenario() {
    let prose = "Hmm, I didn't catch that. Do you want to start the tutorial?";
    let mut session = TutorSession::new(
        CannedModel::new(&[prose]),
        ScriptConsole::new(&["xyzzy plugh"]),
        Tutorial::new(),
        Mode::Code,
    );
    session.run().await.unwrap();

    assert_eq!(session.console().blocks[0], (BlockRole::Assistant, prose.to_string()));
    assert_eq!(session.history().last(), Some(&Message::assistant(prose)));
}

/// Walking the whole tutorial with next_step ends in the completion message
#[tokio::test]
async fn test_walk_to_the_end() {
    let mut session = TutorSession::new(
        CannedModel::new(&["tutorial.show('test')", "tutorial.next_step()"]),
        ScriptConsole::new(&["jump to the end", "what next?"]),
        Tutorial::new(),
        Mode::Code,
    );
    session.run().await.unwrap();

    let blocks = &session.console().blocks;
    assert_eq!(blocks[1].1, "You've completed the tutorial! 🎉");
    assert_eq!(session.tutorial().current(), Topic::Test);
}

/// Code examples do not move the cursor
#[tokio::test]
async fn test_code_example_keeps_cursor() {
    let mut session = TutorSession::new(
        CannedModel::new(&["tutorial.show('models')", "tutorial.show('models_code')"]),
        ScriptConsole::new(&["models", "show me the code"]),
        Tutorial::new(),
        Mode::Code,
    );
    session.run().await.unwrap();

    assert_eq!(session.tutorial().current(), Topic::Models);
    assert!(session.console().blocks[1].1.starts_with("```python"));
}

/// Tool mode runs the environment check through the probe
#[tokio::test]
async fn test_tools_mode_verify_environment() {
    let reply = "```json\n{\"action\": \"verify_environment\", \"parameters\": {}}\n```";
    let mut session = TutorSession::new(
        CannedModel::new(&[reply]),
        ScriptConsole::new(&["check my setup"]),
        Tutorial::with_probe(NoVenvProbe),
        Mode::Tools,
    );
    session.run().await.unwrap();

    let report = &session.console().blocks[0].1;
    assert!(report.contains("✅ Python is installed: Python 3.12.1"));
    assert!(report.contains("Virtual environment not active"));
    assert!(report.contains("Please fix the issues above"));
}

/// A long conversation never grows past the trim bound and keeps the system prompt
#[tokio::test]
async fn test_history_stays_bounded() {
    let replies: Vec<&str> = std::iter::repeat("Keep going!").take(12).collect();
    let inputs: Vec<String> = (0..12).map(|i| format!("message {i}")).collect();
    let inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();

    let mut session = TutorSession::new(
        CannedModel::new(&replies),
        ScriptConsole::new(&inputs),
        Tutorial::new(),
        Mode::Code,
    );
    let system = session.history().first().cloned();
    session.run().await.unwrap();

    assert!(session.history().len() <= 9);
    assert_eq!(session.history().first().cloned(), system);
    assert_eq!(
        session.history().last(),
        Some(&Message::assistant("Keep going!"))
    );
}

/// The real terminal console renders panels around each reply
#[tokio::test]
async fn test_terminal_console_round_trip() {
    let input = tokio_test::io::Builder::new()
        .read(b"hello\n")
        .read(b"/quit\n")
        .build();
    let console = TerminalConsole::new(BufReader::new(input), Vec::new()).with_width(60);
    let mut session = TutorSession::new(
        CannedModel::new(&["tutorial.help('no such table: blog_post')"]),
        console,
        Tutorial::new(),
        Mode::Code,
    );
    session.run().await.unwrap();

    let out = String::from_utf8(session.console().writer().clone()).unwrap();
    assert!(out.starts_with("You: "));
    assert!(out.contains("╭🤖 AI"));
    assert!(out.contains("migrate"));
    assert!(out.contains("Goodbye."));
}

/// The chat loop keeps a plain conversation in history
#[tokio::test]
async fn test_chat_session() {
    let mut chat = ChatSession::new(
        CannedModel::new(&["Django is a web framework."]),
        ScriptConsole::new(&["what is django?", "q"]),
        None,
    );
    chat.run().await.unwrap();

    assert_eq!(
        chat.history().messages(),
        &[
            Message::user("what is django?"),
            Message::assistant("Django is a web framework."),
        ]
    );
}

/// Config file, environment and flags layer in that order
#[test]
fn test_config_layers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "model = \"file-model\"\nhistory_limit = 12\nhistory_keep = 6\nmode = \"tools\"\n",
    )
    .unwrap();

    let config = TutorConfig::load(Some(&path))
        .unwrap()
        .with_env_from(|key| (key == "DJANGO_GIRLS_BASE_URL").then(|| "http://127.0.0.1:1234/v1".to_string()))
        .with_mode(Some(Mode::Code));

    assert_eq!(config.model, "file-model");
    assert_eq!(config.base_url, "http://127.0.0.1:1234/v1");
    assert_eq!(config.mode, Mode::Code);
    assert!(config.validate().is_ok());

    let mut history = History::with_policy(config.history_limit, config.history_keep);
    for i in 0..20 {
        history.push(Message::user(format!("m{i}")));
    }
    history.trim();
    assert_eq!(history.len(), 7);
}
