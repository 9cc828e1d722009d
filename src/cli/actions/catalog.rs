use crate::{
    catalog::{CatalogClient, ColorCache, Filament, FilamentType, Product},
    cli::{actions::context::Context, globals::GlobalArgs},
};
use anyhow::Result;
use tracing::instrument;

#[derive(Debug)]
pub struct ProductsArgs {
    pub globals: GlobalArgs,
    pub id: Option<i64>,
}

#[derive(Debug)]
pub struct DeleteArgs {
    pub globals: GlobalArgs,
    pub id: i64,
}

#[derive(Debug)]
pub struct ColorsArgs {
    pub globals: GlobalArgs,
    pub filament_type: FilamentType,
    pub include_unavailable: bool,
}

/// List the catalog, or show a single product.
///
/// # Errors
/// Returns an error if the session cannot open the page or the request fails.
#[instrument(skip_all, fields(id = ?args.id))]
pub async fn products(args: ProductsArgs) -> Result<()> {
    let context = Context::open(&args.globals)?;

    match args.id {
        Some(id) => {
            context.require_page(&format!("/product/{id}")).await?;
            let product = CatalogClient::new(context.api.clone()).product(id).await?;
            print_product_details(&product);
        }
        None => {
            context.require_page("/").await?;
            let products = CatalogClient::new(context.api.clone()).list_products().await?;
            if products.is_empty() {
                println!("No products");
            }
            for product in &products {
                println!("{}", product_line(product));
            }
        }
    }
    Ok(())
}

/// # Errors
/// Returns an error if the session cannot open the product page or the request fails.
#[instrument(skip_all, fields(id = args.id))]
pub async fn delete(args: DeleteArgs) -> Result<()> {
    let context = Context::open(&args.globals)?;
    context.require_page(&format!("/product/{}", args.id)).await?;

    let response = CatalogClient::new(context.api.clone())
        .delete_product(args.id)
        .await?;
    println!(
        "{}",
        response
            .message
            .unwrap_or_else(|| format!("Product {} deleted", args.id))
    );
    Ok(())
}

/// List the colors offered for a filament type.
///
/// # Errors
/// Returns an error if the request fails.
#[instrument(skip_all, fields(filament_type = %args.filament_type))]
pub async fn colors(args: ColorsArgs) -> Result<()> {
    let context = Context::open(&args.globals)?;
    let cache = ColorCache::new(CatalogClient::new(context.api.clone()));

    if args.include_unavailable {
        for color in cache.colors(args.filament_type).await?.iter() {
            let availability = if color.available { "" } else { " (unavailable)" };
            println!("{}{availability}", filament_line(&Filament::from(color)));
        }
    } else {
        for filament in cache.filaments(args.filament_type).await? {
            println!("{}", filament_line(&filament));
        }
    }
    Ok(())
}

fn product_line(product: &Product) -> String {
    let id = product
        .id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "{id:>5}  {:<32} {:>8.2}  {} {}",
        product.name, product.price, product.filament_type, product.color
    )
}

fn print_product_details(product: &Product) {
    println!("{}", product_line(product));
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    if !product.stl.is_empty() {
        println!("  stl: {}", product.stl);
    }
    for image in &product.image_gallery {
        println!("  image: {image}");
    }
}

fn filament_line(filament: &Filament) -> String {
    format!(
        "{:<8} {:<8} {}",
        filament.hex_color, filament.filament, filament.color_tag
    )
}
