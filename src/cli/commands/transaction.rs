use chrono::{Local, Utc};
use finansys_domain::{Icon, LedgerSnapshot, Transaction, TransactionInput, TransactionType};

use crate::cli::commands::{
    parse_positive_amount, parse_timestamp, require_arg, require_text, split_subcommand,
    CommandDefinition,
};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;

const USAGE: &str = "tx add <income|expense> <amount> <category-id> <description> [date]
tx rm <id>
tx list";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "tx",
        "Record, remove or list transactions",
        USAGE,
        cmd_transaction,
    )]
}

fn cmd_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, "tx <add|rm|list>")?;
    match sub.as_str() {
        "add" => add_transaction(context, rest),
        "rm" | "remove" | "delete" => remove_transaction(context, rest),
        "list" | "ls" => list_transactions(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown tx subcommand `{other}`"
        ))),
    }
}

fn add_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw_kind = require_arg(args, 0, "income|expense")?;
    let kind = TransactionType::parse(raw_kind).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "invalid type `{raw_kind}` (expected income or expense)"
        ))
    })?;
    let amount = parse_positive_amount(require_arg(args, 1, "amount")?)?;
    let category_id = require_arg(args, 2, "category-id")?;
    let description = require_text(require_arg(args, 3, "description")?, "description")?;
    let date = match args.get(4) {
        Some(raw) => parse_timestamp(raw)?,
        None => context.app().now().with_timezone(&Utc),
    };

    if context.app().snapshot().category(category_id).is_none() {
        return Err(CommandError::InvalidArguments(format!(
            "unknown category `{category_id}` (see `cat list`)"
        )));
    }

    let txn = context.app_mut().store_mut().add_transaction(TransactionInput::new(
        kind,
        amount,
        category_id,
        date,
        description,
    ));
    output::success(format!(
        "Recorded {} {} ({}).",
        kind.to_string().to_lowercase(),
        context.money.format(txn.amount),
        txn.id
    ));
    Ok(())
}

fn remove_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = require_arg(args, 0, "id")?;
    let existed = context.app().snapshot().transaction(id).is_some();
    context.app_mut().store_mut().delete_transaction(id);
    if existed {
        output::success(format!("Removed transaction {id}."));
        Ok(())
    } else {
        Err(CommandError::NotFound(format!("No transaction with id `{id}`.")))
    }
}

fn list_transactions(context: &mut ShellContext) -> CommandResult {
    let app = context.app();
    let snapshot = app.snapshot();
    output::section("Transactions");
    output::info(format!(
        "  Total volume: {}",
        context.money.format(app.total_volume())
    ));
    let groups = app.day_groups();
    if groups.is_empty() {
        output::info("  Nothing recorded yet.");
    }
    for group in &groups {
        output::info(format!("\n  {}", group.day.format("%d/%m/%Y")));
        for txn in &group.transactions {
            print_transaction_row(context, &snapshot, txn);
        }
    }
    Ok(())
}

pub(crate) fn print_transaction_row(
    context: &ShellContext,
    snapshot: &LedgerSnapshot,
    txn: &Transaction,
) {
    let display = snapshot.category_display(&txn.category_id);
    output::info(format!(
        "  {} {:<24} {:<14} {:>16}  {}  [{}]",
        Icon::resolve(display.icon).glyph(),
        txn.description,
        output::swatch(display.name, display.color),
        context.money.signed(txn.amount, txn.is_income()),
        txn.date.with_timezone(&Local).format("%d/%m %H:%M"),
        txn.id
    ));
}
