use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

pub mod category;
pub mod subscription;
pub mod summary;
pub mod system;
pub mod transaction;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::currency::parse_amount;

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(summary::definitions());
    commands.extend(transaction::definitions());
    commands.extend(subscription::definitions());
    commands.extend(category::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Splits `tx add ...` style input into the subcommand and its arguments.
pub(crate) fn split_subcommand<'a, 'b>(
    args: &'b [&'a str],
    usage: &str,
) -> Result<(String, &'b [&'a str]), CommandError> {
    match args.split_first() {
        Some((sub, rest)) => Ok((sub.to_lowercase(), rest)),
        None => Err(CommandError::InvalidArguments(format!("usage: {usage}"))),
    }
}

pub(crate) fn require_arg<'a>(args: &[&'a str], index: usize, name: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("missing <{name}>")))
}

pub(crate) fn require_text(value: &str, name: &str) -> Result<String, CommandError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommandError::InvalidArguments(format!("{name} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn parse_positive_amount(input: &str) -> Result<f64, CommandError> {
    match parse_amount(input) {
        Some(value) if value > 0.0 => Ok(value),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid amount `{input}` (expected a number greater than zero)"
        ))),
    }
}

pub(crate) fn parse_due_day(input: &str) -> Result<u32, CommandError> {
    match input.trim().parse::<u32>() {
        Ok(day) if (1..=31).contains(&day) => Ok(day),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid day `{input}` (expected 1 to 31)"
        ))),
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. Plain dates land
/// at local noon so they sit well inside their calendar day.
pub(crate) fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, CommandError> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "invalid date `{input}` (use YYYY-MM-DD or an RFC 3339 timestamp)"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keeps_declaration_order() {
        let registry = CommandRegistry::new(all_definitions());
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names.first(), Some(&"summary"));
        assert!(names.contains(&"tx"));
        assert!(names.contains(&"exit"));
        assert!(registry.get("sub").is_some());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert_eq!(parse_positive_amount("12,5").unwrap(), 12.5);
        assert!(parse_positive_amount("0").is_err());
        assert!(parse_positive_amount("-3").is_err());
        assert!(parse_positive_amount("ten").is_err());
    }

    #[test]
    fn due_days_are_bounded() {
        assert_eq!(parse_due_day("31").unwrap(), 31);
        assert!(parse_due_day("0").is_err());
        assert!(parse_due_day("32").is_err());
    }

    #[test]
    fn timestamps_accept_rfc3339_and_dates() {
        let stamp = parse_timestamp("2025-03-04T10:00:00-03:00").unwrap();
        assert_eq!(stamp, Utc.with_ymd_and_hms(2025, 3, 4, 13, 0, 0).unwrap());

        let date_only = parse_timestamp("2025-03-04").unwrap();
        assert_eq!(date_only.with_timezone(&Local).date_naive(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert!(parse_timestamp("04/03/2025").is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("   ", "description").is_err());
        assert_eq!(require_text(" Rent ", "description").unwrap(), "Rent");
    }
}
