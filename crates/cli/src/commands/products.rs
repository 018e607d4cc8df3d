//! Product commands.

use stockroom_admin::ProductFilters;
use stockroom_core::{Category, ProductChanges, ProductDraft, ProductId};

use super::CommandError;
use crate::context::AppContext;
use crate::output;
use crate::{CreateArgs, ListArgs, UpdateArgs};

/// Fetch and print one page of the merged catalog.
pub async fn list(ctx: &mut AppContext, args: ListArgs) -> Result<(), CommandError> {
    let mut filters = ProductFilters::new();
    if let Some(search) = args.search {
        filters.set_search(search);
    }
    if let Some(slug) = args.category {
        let category =
            Category::parse(&slug).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
        filters.set_category(Some(category));
    }
    filters.set_sort(args.sort, args.order);
    filters.set_per_page(args.per_page);
    filters.set_page(args.page);

    let page = ctx.catalog.refresh(&filters.to_query()).await?;
    if ctx.json {
        return Ok(output::json(&page.items)?);
    }
    output::page(&page, filters.page(), filters.page_count(page.total));
    Ok(())
}

pub async fn get(ctx: &AppContext, id: &ProductId) -> Result<(), CommandError> {
    let product = ctx.catalog.get(id).await?;
    if ctx.json {
        return Ok(output::json(&product)?);
    }
    output::product(&product);
    Ok(())
}

pub async fn create(ctx: &mut AppContext, args: CreateArgs) -> Result<(), CommandError> {
    let grant = ctx.session.require_admin()?;
    let draft = ProductDraft {
        title: args.title,
        description: args.description,
        price: args.price,
        category: args.category,
        stock: args.stock,
        brand: args.brand,
        discount_percentage: args.discount,
        rating: args.rating,
        thumbnail: args.thumbnail,
    };

    let product = ctx.catalog.create(grant, &draft).await?;
    if ctx.json {
        return Ok(output::json(&product)?);
    }
    output::line(&format!("Created {}", product.id));
    output::product(&product);
    Ok(())
}

pub async fn update(
    ctx: &mut AppContext,
    id: &ProductId,
    args: UpdateArgs,
) -> Result<(), CommandError> {
    let grant = ctx.session.require_admin()?;
    let changes = ProductChanges {
        title: args.title,
        description: args.description,
        price: args.price,
        category: args.category,
        stock: args.stock,
        brand: args.brand,
        discount_percentage: args.discount,
        rating: args.rating,
        thumbnail: args.thumbnail,
    };

    let product = ctx.catalog.update(grant, id, &changes).await?;
    if ctx.json {
        return Ok(output::json(&product)?);
    }
    if let Some(original) = product.original_api_id {
        output::line(&format!("Saved {} as local copy {}", original, product.id));
    } else {
        output::line(&format!("Updated {}", product.id));
    }
    output::product(&product);
    Ok(())
}

pub async fn delete(ctx: &mut AppContext, id: &ProductId) -> Result<(), CommandError> {
    let grant = ctx.session.require_admin()?;
    if ctx.catalog.delete(grant, id).await? {
        output::line(&format!("Deleted {id}"));
    } else {
        output::line(&format!("Nothing to delete for {id}"));
    }
    Ok(())
}

pub async fn categories(ctx: &AppContext) -> Result<(), CommandError> {
    let categories = ctx.catalog.categories().await?;
    if ctx.json {
        return Ok(output::json(&categories)?);
    }
    output::categories(&categories);
    Ok(())
}
