use chrono::{Datelike, Local};
use finansys_domain::{clamped_day, Icon, SubscriptionInput};

use crate::cli::commands::{
    parse_due_day, parse_positive_amount, require_arg, require_text, split_subcommand,
    CommandDefinition,
};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;

const USAGE: &str = "sub add <name> <amount> <day>
sub rm <id>
sub list";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "sub",
            "Manage recurring monthly subscriptions",
            USAGE,
            cmd_subscription,
        ),
        CommandDefinition::new(
            "reminders",
            "List pending payment reminders",
            "reminders",
            cmd_reminders,
        ),
    ]
}

fn cmd_subscription(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, "sub <add|rm|list>")?;
    match sub.as_str() {
        "add" => add_subscription(context, rest),
        "rm" | "remove" | "delete" => remove_subscription(context, rest),
        "list" | "ls" => list_subscriptions(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown sub subcommand `{other}`"
        ))),
    }
}

fn add_subscription(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = require_text(require_arg(args, 0, "name")?, "name")?;
    let amount = parse_positive_amount(require_arg(args, 1, "amount")?)?;
    let day = parse_due_day(require_arg(args, 2, "day")?)?;

    let today = context.app().now().date_naive();
    let due_date = clamped_day(today.year(), today.month(), day).ok_or_else(|| {
        CommandError::InvalidArguments(format!("day {day} does not exist this month"))
    })?;

    let subscription = context
        .app_mut()
        .store_mut()
        .add_subscription(SubscriptionInput::new(name, amount, due_date));
    output::success(format!(
        "Subscription {} added ({} on day {}) [{}].",
        subscription.name,
        context.money.format(subscription.amount),
        subscription.due_day(),
        subscription.id
    ));
    Ok(())
}

fn remove_subscription(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = require_arg(args, 0, "id")?;
    let existed = context.app().snapshot().subscription(id).is_some();
    context.app_mut().store_mut().delete_subscription(id);
    if existed {
        output::success(format!("Removed subscription {id}."));
        Ok(())
    } else {
        Err(CommandError::NotFound(format!("No subscription with id `{id}`.")))
    }
}

fn list_subscriptions(context: &mut ShellContext) -> CommandResult {
    let app = context.app();
    let snapshot = app.snapshot();
    output::section("Subscriptions");
    output::info(format!(
        "  Monthly total: {}",
        context.money.format(app.statistics().subscription_total)
    ));
    if snapshot.subscriptions.is_empty() {
        output::info("  No subscriptions yet.");
    }
    for subscription in &snapshot.subscriptions {
        output::info(format!(
            "  {} {:<20} {:>16}  day {:>2}  [{}]",
            Icon::resolve(&subscription.icon).glyph(),
            output::swatch(&subscription.name, &subscription.color),
            context.money.format(subscription.amount),
            subscription.due_day(),
            subscription.id
        ));
    }
    Ok(())
}

fn cmd_reminders(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let pending = context.app().pending_reminders();
    output::section("Pending reminders");
    if pending.is_empty() {
        output::info("  No reminders scheduled.");
    }
    for reminder in &pending {
        output::info(format!(
            "  {}  {} {}",
            reminder.trigger_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
            reminder.title,
            reminder.body
        ));
    }
    Ok(())
}
