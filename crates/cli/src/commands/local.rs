//! Local record store commands.

use super::CommandError;
use crate::context::AppContext;
use crate::output;

pub fn list(ctx: &AppContext) -> Result<(), CommandError> {
    let products = ctx.catalog.store().list();
    if ctx.json {
        return Ok(output::json(&products)?);
    }
    if products.is_empty() {
        output::line("No local products");
        return Ok(());
    }
    output::products(&products);
    output::line(&format!("{} local products", products.len()));
    Ok(())
}

/// Remove every local product, including edited copies.
pub fn clear(ctx: &AppContext) -> Result<(), CommandError> {
    let count = ctx.catalog.store().list().len();
    ctx.catalog.store().clear()?;
    tracing::info!(count, "local products cleared");
    output::line(&format!("Removed {count} local products"));
    Ok(())
}
