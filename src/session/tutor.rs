//! Conversation controller for the tutorial loop
//!
//! One turn: read a line, ask the model, interpret the reply, run the
//! actions it names, show the results, then trim the history.

use super::prompts::system_prompt;
use crate::actions::{Action, ActionError, Mode};
use crate::display::{BlockRole, Console, InputLine, Prompt};
use crate::interpreter::{ActionCall, Interpretation, Interpreter};
use crate::message::{History, Message};
use crate::model::ChatModel;
use crate::tutorial::Tutorial;
use crate::Result;
use tracing::{debug, info, warn};

const EXIT_COMMANDS: [&str; 2] = ["/exit", "/quit"];

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The learner typed an exit command
    Quit,
    /// Input ended or was interrupted
    Closed,
}

/// The tutorial loop, owning its history and tutorial state
pub struct TutorSession<M, C> {
    model: M,
    console: C,
    tutorial: Tutorial,
    history: History,
    interpreter: Interpreter,
    mode: Mode,
}

impl<M: ChatModel, C: Console> TutorSession<M, C> {
    pub fn new(model: M, console: C, tutorial: Tutorial, mode: Mode) -> Self {
        Self {
            model,
            console,
            tutorial,
            history: History::with_system(system_prompt(mode)),
            interpreter: Interpreter::new(),
            mode,
        }
    }

    /// Override when and how far the history is trimmed
    pub fn with_history_policy(mut self, limit: usize, keep: usize) -> Self {
        self.history.set_policy(limit, keep);
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tutorial(&self) -> &Tutorial {
        &self.tutorial
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Run turns until the learner exits or input closes
    pub async fn run(&mut self) -> Result<SessionEnd> {
        info!("Tutorial session started in {:?} mode", self.mode);
        loop {
            let line = match self.console.read_line(Prompt::Adaptive).await? {
                InputLine::Line(line) => line,
                InputLine::Closed => {
                    self.console.render(BlockRole::System, "Exiting.")?;
                    return Ok(SessionEnd::Closed);
                }
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if EXIT_COMMANDS.iter().any(|cmd| input.eq_ignore_ascii_case(cmd)) {
                self.console.render(BlockRole::System, "Goodbye.")?;
                return Ok(SessionEnd::Quit);
            }

            self.turn(input).await?;
        }
    }

    /// Handle one learner message.
    ///
    /// Completion and action failures are reported and absorbed; only
    /// console failures are returned.
    pub async fn turn(&mut self, input: &str) -> Result<()> {
        self.history.push(Message::user(input));

        match self.model.complete(self.history.messages()).await {
            Ok(reply) => self.handle_reply(&reply)?,
            Err(e) => {
                warn!("Completion failed: {}", e);
                self.console.render(BlockRole::System, &format!("Error: {e}"))?;
            }
        }

        let dropped = self.history.trim();
        if dropped > 0 {
            debug!("Trimmed {} messages from history", dropped);
        }
        Ok(())
    }

    fn handle_reply(&mut self, reply: &str) -> Result<()> {
        match self.interpreter.interpret(reply) {
            Ok(Interpretation::Actions(calls)) => self.dispatch(calls, reply),
            Ok(Interpretation::NoAction) => self.show_raw(reply),
            Err(e) => {
                warn!("Unusable reply: {}", e);
                self.report_failure(&e.to_string())
            }
        }
    }

    fn dispatch(&mut self, calls: Vec<ActionCall>, reply: &str) -> Result<()> {
        let mut resolved = 0;

        for call in calls {
            match Action::resolve(&call, self.mode) {
                Ok(action) => {
                    resolved += 1;
                    info!("Running {}", call);
                    let result = action.execute(&mut self.tutorial);
                    if result.is_empty() {
                        continue;
                    }
                    self.console.render(BlockRole::Assistant, &result)?;
                    // The result itself stays out of the history
                    self.history.push(Message::assistant(format!(
                        "I called: {}{}\n\nResult shown above.",
                        self.call_prefix(),
                        call
                    )));
                }
                Err(e @ ActionError::Unresolved(_)) => {
                    warn!("{}", e);
                    self.console.render(BlockRole::System, &e.to_string())?;
                }
                Err(e @ ActionError::InvalidArguments { .. }) => {
                    resolved += 1;
                    warn!("{}", e);
                    self.report_failure(&e.to_string())?;
                }
            }
        }

        if resolved == 0 {
            debug!("No call resolved, showing the reply as is");
            self.show_raw(reply)?;
        }
        Ok(())
    }

    /// Report a failed call and follow up with the matching help tip
    fn report_failure(&mut self, error: &str) -> Result<()> {
        self.console
            .render(BlockRole::System, &format!("Error executing code: {error}"))?;
        let tip = self.tutorial.help(error);
        self.console.render(BlockRole::Assistant, &tip)
    }

    fn show_raw(&mut self, reply: &str) -> Result<()> {
        if reply.trim().is_empty() {
            return self
                .console
                .render(BlockRole::System, "The model returned an empty reply.");
        }
        self.console.render(BlockRole::Assistant, reply)?;
        self.history.push(Message::assistant(reply));
        Ok(())
    }

    fn call_prefix(&self) -> &'static str {
        match self.mode {
            Mode::Code => "tutorial.",
            Mode::Tools => "",
        }
    }
}
