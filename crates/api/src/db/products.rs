//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use ecostore_core::{Category, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Raw `product` row.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    stock: i32,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            category,
            stock: row.stock,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Sort orders accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
    Oldest,
}

impl ProductSort {
    /// The ORDER BY fragment for this sort. Whitelisted, never user input.
    const fn order_by(self) -> &'static str {
        match self {
            Self::NameAsc => "name ASC",
            Self::NameDesc => "name DESC",
            Self::PriceAsc => "price ASC",
            Self::PriceDesc => "price DESC",
            Self::Newest => "created_at DESC",
            Self::Oldest => "created_at ASC",
        }
    }

    /// Parse `sort`/`order` query parameters.
    #[must_use]
    pub fn from_params(sort: Option<&str>, order: Option<&str>) -> Self {
        let descending = matches!(order, Some("desc"));
        match sort {
            Some("name") => {
                if descending {
                    Self::NameDesc
                } else {
                    Self::NameAsc
                }
            }
            Some("price") => {
                if descending {
                    Self::PriceDesc
                } else {
                    Self::PriceAsc
                }
            }
            Some("createdAt" | "created_at") if !descending => Self::Oldest,
            _ => Self::Newest,
        }
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to one category.
    pub category: Option<Category>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    /// Sort order.
    pub sort: ProductSort,
    /// Zero-based page offset.
    pub offset: i64,
    /// Page size.
    pub limit: i64,
}

/// New or replacement product fields, already validated.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub stock: i32,
    pub image_url: Option<String>,
}

/// Aggregate catalog statistics.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CatalogStats {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub out_of_stock_products: i64,
    pub in_stock_products: i64,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, description, price, category, stock, image_url, created_at, updated_at
             FROM product WHERE TRUE",
        );

        if let Some(category) = filter.category {
            builder.push(" AND category = ");
            builder.push_bind(category.as_str());
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY ");
        builder.push(filter.sort.order_by());
        builder.push(" LIMIT ");
        builder.push_bind(filter.limit);
        builder.push(" OFFSET ");
        builder.push_bind(filter.offset);

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, category, stock, image_url, created_at, updated_at
             FROM product WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO product (name, description, price, category, stock, image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, name, description, price, category, stock, image_url, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category.as_str())
        .bind(input.stock)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE product
             SET name = $2, description = $3, price = $4, category = $5,
                 stock = $6, image_url = $7, updated_at = now()
             WHERE id = $1
             RETURNING id, name, description, price, category, stock, image_url, created_at, updated_at",
        )
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category.as_str())
        .bind(input.stock)
        .bind(&input.image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Product::try_from(row)
    }

    /// Delete a product.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate stock statistics for the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn statistics(&self) -> Result<CatalogStats, RepositoryError> {
        let (total, low, out): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE stock > 0 AND stock <= $1),
                    COUNT(*) FILTER (WHERE stock = 0)
             FROM product",
        )
        .bind(ecostore_core::limits::LOW_STOCK_THRESHOLD)
        .fetch_one(self.pool)
        .await?;

        Ok(CatalogStats {
            total_products: total,
            low_stock_products: low,
            out_of_stock_products: out,
            in_stock_products: total - out,
        })
    }
}

/// Escape LIKE metacharacters in user-supplied search text.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_sort_from_params() {
        assert_eq!(ProductSort::from_params(None, None), ProductSort::Newest);
        assert_eq!(
            ProductSort::from_params(Some("name"), None),
            ProductSort::NameAsc
        );
        assert_eq!(
            ProductSort::from_params(Some("name"), Some("desc")),
            ProductSort::NameDesc
        );
        assert_eq!(
            ProductSort::from_params(Some("price"), Some("desc")),
            ProductSort::PriceDesc
        );
        assert_eq!(
            ProductSort::from_params(Some("createdAt"), Some("asc")),
            ProductSort::Oldest
        );
        assert_eq!(
            ProductSort::from_params(Some("bogus"), Some("asc")),
            ProductSort::Newest
        );
    }
}
