use finansys_domain::Icon;

use crate::cli::commands::transaction::print_transaction_row;
use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "summary",
        "Monthly totals, spending by category and recent activity",
        "summary",
        cmd_summary,
    )]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let app = context.app();
    let stats = app.statistics();
    let snapshot = app.snapshot();
    let money = &context.money;

    output::section(format!("Summary for {}", app.now().format("%B %Y")));
    output::info(format!("  Income             {}", money.format(stats.income)));
    output::info(format!("  Expenses           {}", money.format(stats.expense)));
    output::info(format!(
        "  Subscriptions      {}",
        money.format(stats.subscription_total)
    ));
    output::info(format!(
        "  Projected balance  {}",
        money.format(stats.projected_balance)
    ));

    output::section("Spending by category");
    if stats.chart.is_empty() {
        output::info("  No expenses this month.");
    }
    for slice in &stats.chart {
        let display = snapshot.category_display(&slice.category_id);
        let share = if stats.expense > 0.0 {
            slice.value / stats.expense * 100.0
        } else {
            0.0
        };
        output::info(format!(
            "  {} {} {:>16} {:>6.1}%",
            Icon::resolve(display.icon).glyph(),
            output::swatch(&format!("{:<14}", slice.name), &slice.color),
            money.format(slice.value),
            share
        ));
    }

    output::section("Recent transactions");
    if stats.recent_transactions.is_empty() {
        output::info("  Nothing recorded yet.");
    }
    for txn in &stats.recent_transactions {
        print_transaction_row(context, &snapshot, txn);
    }
    Ok(())
}
