use std::{env, io};

use dialoguer::Confirm;
use finansys_config::{resolve_base_dir, Config, ConfigError, ConfigManager};
use rustyline::error::ReadlineError;

use crate::{
    cli::{
        commands::{all_definitions, CommandDefinition, CommandRegistry},
        output::{self, OutputPreferences},
    },
    currency::MoneyFormat,
    App, FinansysError,
};

/// Script mode reads commands from stdin without line editing.
pub const SCRIPT_ENV_VAR: &str = "FINANSYS_CLI_SCRIPT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

impl CliMode {
    pub fn from_env() -> Self {
        if env::var_os(SCRIPT_ENV_VAR).is_some() {
            CliMode::Script
        } else {
            CliMode::Interactive
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    App(#[from] FinansysError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] FinansysError),
    #[error("line editor failed: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::App(err.into())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub money: MoneyFormat,
    pub running: bool,
    app: App,
}

impl ShellContext {
    pub fn new(mode: CliMode, app: App) -> Self {
        let money = MoneyFormat::for_locale(&app.config().locale, &app.config().currency_symbol);
        Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            money,
            running: true,
            app,
        }
    }

    /// Loads config from the base directory, sets up logging and output
    /// preferences, then opens the ledger.
    pub fn load(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::with_base_dir(resolve_base_dir())?;
        let config = manager.load()?;
        crate::init_with_filter(&config.log_filter);
        tracing::debug!(path = %manager.config_path().display(), "config loaded");
        output::set_preferences(OutputPreferences {
            color_enabled: color_enabled(&config),
        });
        let app = App::bootstrap(config)?;
        Ok(Self::new(mode, app))
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn into_app(self) -> App {
        self.app
    }

    pub fn prompt(&self) -> String {
        "finansys> ".into()
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.get(command).map(|definition| definition.handler) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        let best = self
            .registry
            .names()
            .map(|name| (strsim::levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 2 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::new()
            .with_prompt("Exit finansys?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::NotFound(message) => {
                output::warning(message);
                Ok(())
            }
            CommandError::Dialoguer(err) => Err(err.into()),
            CommandError::App(err) => {
                output::error(&err);
                Ok(())
            }
        }
    }
}

fn color_enabled(config: &Config) -> bool {
    config.ui_color_enabled && env::var_os("NO_COLOR").is_none()
}
