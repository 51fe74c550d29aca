//! Product catalog routes.
//!
//! Public listing and detail endpoints plus admin-only mutations. Listing
//! supports category filter, free-text search, sorting, and pagination.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ecostore_core::{Category, ProductId, limits};

use crate::db::products::{CatalogStats, ProductFilter, ProductInput, ProductRepository, ProductSort};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 50;

/// Query parameters for the listing endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameter for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// New or replacement product fields, as received on the wire.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    pub image_url: Option<String>,
}

/// A product with derived stock flags.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub is_out_of_stock: bool,
    pub is_low_stock: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            is_out_of_stock: product.is_out_of_stock(),
            is_low_stock: product.is_low_stock(),
            product,
        }
    }
}

/// Paged product listing.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub page: i64,
    pub limit: i64,
}

/// List products.
///
/// GET /api/products
///
/// # Errors
///
/// 400 for an unknown category, 500 on database failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>> {
    let filter = filter_from_query(&query)?;
    let products = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(ProductListResponse {
        products: products.into_iter().map(Into::into).collect(),
        page: filter.offset / filter.limit + 1,
        limit: filter.limit,
    }))
}

/// Free-text search over name and description.
///
/// GET /api/products/search?q=
///
/// # Errors
///
/// 500 on database failure.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductResponse>>> {
    let filter = ProductFilter {
        search: Some(query.q),
        limit: MAX_PAGE_SIZE,
        ..ProductFilter::default()
    };

    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// List products in one category.
///
/// GET /api/products/category/{category}
///
/// # Errors
///
/// 400 for an unknown category.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<ProductResponse>>> {
    let category = parse_category(&category)?;
    let filter = ProductFilter {
        category: Some(category),
        limit: MAX_PAGE_SIZE,
        ..ProductFilter::default()
    };

    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// A single product.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// 404 when the product doesn't exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    Ok(Json(product.into()))
}

/// Create a product.
///
/// POST /api/products (admin only)
///
/// # Errors
///
/// 403 without an admin token, 400 on field validation failure.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductResponse>> {
    let input = validate_payload(payload)?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(product_id = %product.id, admin = %admin.username, "product created");

    Ok(Json(product.into()))
}

/// Replace a product's fields.
///
/// PUT /api/products/{id} (admin only)
///
/// # Errors
///
/// 404 when the product doesn't exist, 400 on field validation failure.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductResponse>> {
    let input = validate_payload(payload)?;
    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await?;

    Ok(Json(product.into()))
}

/// Delete a product.
///
/// DELETE /api/products/{id} (admin only)
///
/// # Errors
///
/// 404 when the product doesn't exist.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Product".to_owned()));
    }

    tracing::info!(product_id = id, admin = %admin.username, "product deleted");

    Ok(Json(serde_json::json!({ "message": "Product deleted" })))
}

/// Aggregate stock statistics.
///
/// GET /api/products/admin/statistics (admin only)
///
/// # Errors
///
/// 403 without an admin token.
pub async fn statistics(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<CatalogStats>> {
    let stats = ProductRepository::new(state.pool()).statistics().await?;
    Ok(Json(stats))
}

/// Build a repository filter from listing query parameters.
fn filter_from_query(query: &ListQuery) -> Result<ProductFilter> {
    let category = query
        .category
        .as_deref()
        .map(parse_category)
        .transpose()?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);

    Ok(ProductFilter {
        category,
        search: query.search.clone(),
        sort: ProductSort::from_params(query.sort.as_deref(), query.order.as_deref()),
        offset: (page - 1) * limit,
        limit,
    })
}

fn parse_category(s: &str) -> Result<Category> {
    s.parse()
        .map_err(|_| AppError::Validation(format!("Unknown category: {s}")))
}

/// Validate wire fields into a repository input.
fn validate_payload(payload: ProductPayload) -> Result<ProductInput> {
    let name = payload.name.trim().to_owned();
    if name.is_empty() || name.len() > limits::MAX_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Name must be 1-{} characters",
            limits::MAX_NAME_LENGTH
        )));
    }

    let description = payload.description.trim().to_owned();
    if description.is_empty() || description.len() > limits::MAX_DESCRIPTION_LENGTH {
        return Err(AppError::Validation(format!(
            "Description must be 1-{} characters",
            limits::MAX_DESCRIPTION_LENGTH
        )));
    }

    if payload.price < limits::MIN_PRICE || payload.price > limits::MAX_PRICE {
        return Err(AppError::Validation(format!(
            "Price must be between {} and {}",
            limits::MIN_PRICE,
            limits::MAX_PRICE
        )));
    }

    if payload.stock < 0 {
        return Err(AppError::Validation("Stock cannot be negative".to_owned()));
    }

    let category = parse_category(&payload.category)?;

    Ok(ProductInput {
        name,
        description,
        price: payload.price,
        category,
        stock: payload.stock,
        image_url: payload.image_url,
    })
}
