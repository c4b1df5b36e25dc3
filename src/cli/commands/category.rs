use finansys_domain::{CategoryInput, Icon, AVAILABLE_ICONS};

use crate::cli::commands::{require_arg, require_text, split_subcommand, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;

const USAGE: &str = "cat add <name> <icon> <color>
cat rm <id>
cat list";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("cat", "Manage spending categories", USAGE, cmd_category),
        CommandDefinition::new("icons", "List icons available to categories", "icons", cmd_icons),
    ]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (sub, rest) = split_subcommand(args, "cat <add|rm|list>")?;
    match sub.as_str() {
        "add" => add_category(context, rest),
        "rm" | "remove" | "delete" => remove_category(context, rest),
        "list" | "ls" => list_categories(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown cat subcommand `{other}`"
        ))),
    }
}

fn add_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = require_text(require_arg(args, 0, "name")?, "name")?;
    let icon = require_arg(args, 1, "icon")?;
    let color = require_arg(args, 2, "color")?;

    if !Icon::is_pickable(icon) {
        return Err(CommandError::InvalidArguments(format!(
            "unknown icon `{icon}` (see `icons`)"
        )));
    }
    let color = normalize_color(color).ok_or_else(|| {
        CommandError::InvalidArguments(format!("invalid color `{color}` (expected #rrggbb)"))
    })?;

    let category = context
        .app_mut()
        .store_mut()
        .add_category(CategoryInput::new(name, icon, color));
    output::success(format!("Category {} added [{}].", category.name, category.id));
    Ok(())
}

fn remove_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = require_arg(args, 0, "id")?;
    let snapshot = context.app().snapshot();
    if snapshot.category(id).is_none() {
        return Err(CommandError::NotFound(format!("No category with id `{id}`.")));
    }
    let orphaned = snapshot
        .transactions
        .iter()
        .filter(|txn| txn.category_id == id)
        .count();
    context.app_mut().store_mut().delete_category(id);
    output::success(format!("Removed category {id}."));
    if orphaned > 0 {
        output::hint(format!(
            "{orphaned} transaction(s) now show under the fallback category."
        ));
    }
    Ok(())
}

fn list_categories(context: &mut ShellContext) -> CommandResult {
    let snapshot = context.app().snapshot();
    output::section("Categories");
    for category in &snapshot.categories {
        output::info(format!(
            "  {:<14} {} {}",
            category.id,
            Icon::resolve(&category.icon).glyph(),
            output::swatch(&category.name, &category.color)
        ));
    }
    Ok(())
}

fn cmd_icons(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Icons");
    for name in AVAILABLE_ICONS {
        output::info(format!("  {} {}", Icon::resolve(name).glyph(), name));
    }
    Ok(())
}

/// `#rrggbb` in lowercase. The leading `#` is optional on input since an
/// unquoted `#` starts a comment in the shell.
fn normalize_color(value: &str) -> Option<String> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", digits.to_ascii_lowercase()))
    } else {
        None
    }
}
