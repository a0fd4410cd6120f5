//! The `rollbook theme` command.

use anyhow::Result;

use rollbook_core::preferences::{load_theme, save_theme, Theme};

use super::Context;

pub fn execute(ctx: &Context, theme: Option<Theme>, toggle: bool) -> Result<()> {
    let mut storage = ctx.config.open_storage();
    let current = load_theme(&storage)?;

    let next = match (theme, toggle) {
        (Some(theme), _) => theme,
        (None, true) => current.toggled(),
        (None, false) => {
            println!("{current}");
            return Ok(());
        }
    };

    save_theme(&mut storage, next)?;
    println!("Theme set to {next}");
    Ok(())
}
