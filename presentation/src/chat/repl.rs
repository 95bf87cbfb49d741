//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::ConsoleFormatter;
use crate::output::formatter::OutputFormatter;
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use hotbox_application::{DispatchUseCase, ModeCatalog, ModeChoice};
use hotbox_domain::{Mode, OutputFormat, Prompt, SessionId};
use reedline::{
    DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Lines kept in the readline history file
const HISTORY_CAPACITY: usize = 1000;

/// A slash command typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    /// Show the current mode, or switch to the given one
    Mode(Option<String>),
    Modes,
    Providers,
    Session,
    /// Start a fresh session (forget chat history)
    New,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line that starts with `/`
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        match name {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/mode" | "/m" => {
                ReplCommand::Mode((!rest.is_empty()).then(|| rest.to_string()))
            }
            "/modes" => ReplCommand::Modes,
            "/providers" => ReplCommand::Providers,
            "/session" => ReplCommand::Session,
            "/new" => ReplCommand::New,
            other => ReplCommand::Unknown(other.to_string()),
        }
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<DispatchUseCase>,
    catalog: ModeCatalog,
    choice: ModeChoice,
    session: SessionId,
    show_progress: bool,
    format: OutputFormat,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(use_case: Arc<DispatchUseCase>, catalog: ModeCatalog, choice: ModeChoice) -> Self {
        Self {
            use_case,
            catalog,
            choice,
            session: SessionId::new(),
            show_progress: true,
            format: OutputFormat::Full,
            history_path: None,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set how each answer is printed
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Continue an existing session instead of starting a new one
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = session;
        self
    }

    /// Persist readline history to this file
    pub fn with_history_file(mut self, path: PathBuf) -> Self {
        self.history_path = Some(path);
        self
    }

    pub fn mode(&self) -> &ModeChoice {
        &self.choice
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut line_editor = Reedline::create();

        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => tracing::warn!("Chat history unavailable: {}", e),
            }
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("hotbox".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(ReplCommand::parse(line)) {
                            break;
                        }
                        continue;
                    }

                    self.process_prompt(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                #[allow(unreachable_patterns)]
                _ => continue,
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          Holly Hot Box - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Mode:    {}", self.choice);
        println!("Session: {}", self.session);
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /mode [spec]      - Show or switch mode (e.g. fastest, best:gemini,grok@openai, auto)");
        println!("  /modes            - List policies and configured presets");
        println!("  /providers        - List registered providers");
        println!("  /session          - Show the current session id");
        println!("  /new              - Start a new session");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
            }
            ReplCommand::Mode(None) => {
                println!("Current mode: {}", self.choice);
            }
            ReplCommand::Mode(Some(spec)) => {
                match self.catalog.choose(&spec, self.use_case.registry()) {
                    Ok(choice) => {
                        println!("{} {}", "Mode set to".green(), choice);
                        self.choice = choice;
                    }
                    Err(e) => eprintln!("{} {}", "Error:".red(), e),
                }
            }
            ReplCommand::Modes => {
                println!();
                println!("Policies:");
                for kind in hotbox_domain::ModeKind::all() {
                    println!("  {:<10} - {}", kind.as_str(), kind.description());
                }
                let presets: Vec<_> = self.catalog.presets().collect();
                if !presets.is_empty() {
                    println!("Presets:");
                    for (name, mode) in presets {
                        println!("  {:<10} - {}", name, mode);
                    }
                }
                println!("Auto routes:");
                for (level, target) in self.catalog.router().routes() {
                    println!("  {:<14} -> {}", level.as_str(), target);
                }
                println!();
            }
            ReplCommand::Providers => {
                println!();
                println!("Registered providers:");
                for provider in self.use_case.registry().iter() {
                    let id = provider.id();
                    println!("  - {:<12} {}", id.as_str(), id.display_name());
                }
                println!();
            }
            ReplCommand::Session => {
                println!("Session: {}", self.session);
            }
            ReplCommand::New => {
                self.session = SessionId::new();
                println!("Started new session {}", self.session);
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    /// The mode this prompt dispatches with; `auto` scores the text first
    fn mode_for(&self, text: &str) -> Result<Mode, String> {
        self.catalog
            .mode_for(&self.choice, text, self.use_case.registry())
            .map_err(|e| e.to_string())
    }

    async fn process_prompt(&self, text: &str) {
        println!();

        let mode = match self.mode_for(text) {
            Ok(mode) => mode,
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                return;
            }
        };
        if self.choice == ModeChoice::Auto {
            println!("{} {}", "Routed to".dimmed(), mode);
        }

        let prompt = match Prompt::new(text, mode) {
            Ok(prompt) => prompt.in_session(self.session.clone()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                return;
            }
        };

        let dispatch = async {
            if self.show_progress {
                let progress = ProgressReporter::new();
                self.use_case.dispatch_with_progress(&prompt, &progress).await
            } else {
                self.use_case.dispatch(&prompt).await
            }
        };

        // Ctrl-C abandons this prompt only; dropping the dispatch aborts its calls
        let result = tokio::select! {
            result = dispatch => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("{}", "Cancelled.".yellow());
                return;
            }
        };

        match result {
            Ok(result) => print!("{}", ConsoleFormatter.render(&result, self.format)),
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
        println!();
    }
}
