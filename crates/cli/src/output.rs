//! Terminal output.
//!
//! Results go to stdout; logs go to stderr so output stays pipeable.

#![allow(clippy::print_stdout)]

use serde::Serialize;
use stockroom_admin::CatalogPage;
use stockroom_admin::api::{CategoryInfo, UserProfile};
use stockroom_core::Product;

/// Pretty-print any serializable value.
pub fn json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn line(text: &str) {
    println!("{text}");
}

fn product_row(product: &Product) -> String {
    let marker = if product.edited_from_api {
        "*"
    } else if product.id.is_local() {
        "+"
    } else {
        " "
    };
    format!(
        "{marker} {:<24} {:<40} {:>10} {:>6}  {}",
        product.id.to_string(),
        truncate(&product.title, 40),
        product.price.to_string(),
        product.stock,
        product.category.label(),
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

pub fn products(products: &[Product]) {
    for product in products {
        println!("{}", product_row(product));
    }
}

pub fn page(page: &CatalogPage, page_number: usize, page_count: usize) {
    products(&page.items);
    println!(
        "Page {page_number} of {page_count}, {} products ({} local). + local, * edited copy",
        page.total, page.local_count
    );
}

pub fn product(product: &Product) {
    println!("{}", product.title);
    println!("  id:          {}", product.id);
    println!("  source:      {}", product.source());
    println!("  price:       {}", product.price);
    println!("  category:    {}", product.category.label());
    println!("  stock:       {}", product.stock);
    if let Some(brand) = &product.brand {
        println!("  brand:       {brand}");
    }
    if let Some(discount) = product.discount_percentage {
        println!("  discount:    {discount}%");
    }
    if let Some(rating) = product.rating {
        println!("  rating:      {rating:.2}");
    }
    if let Some(original) = product.original_api_id {
        println!("  copy of:     {original}");
    }
    println!("  thumbnail:   {}", product.thumbnail_or_placeholder());
    println!("  {}", product.description);
}

pub fn categories(categories: &[CategoryInfo]) {
    for category in categories {
        println!("{:<24} {}", category.slug, category.name);
    }
}

pub fn user(user: &UserProfile, is_admin: bool) {
    let role = if is_admin { "admin" } else { "user" };
    println!("{} (@{}, {role})", user.display_name(), user.username);
    if let Some(email) = &user.email {
        println!("  {email}");
    }
}
