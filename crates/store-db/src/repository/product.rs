//! Product repository.
//!
//! Catalog reads and admin catalog writes. Stock is mutated here only by
//! explicit admin updates; checkout uses its own guarded decrement inside
//! the order transaction.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use store_core::Product;

use crate::error::{DbError, DbResult};

/// Filter and pagination parameters for product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Restrict to one category.
    pub category_id: Option<String>,

    /// Case-insensitive substring match on name.
    pub search: Option<String>,

    /// 1-based page number.
    pub page: u32,

    /// Items per page.
    pub page_size: u32,
}

/// One page of products together with the total count for the filter.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new product repository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products with optional category/search filters and pagination.
    ///
    /// ## Returns
    /// A page of products plus the total row count matching the filter, so
    /// clients can compute page counts.
    pub async fn list(&self, query: &ProductQuery) -> DbResult<ProductPage> {
        let page = query.page.max(1);
        let page_size = query
            .page_size
            .clamp(1, store_core::MAX_PAGE_SIZE);
        let offset = (page as i64 - 1) * page_size as i64;

        let mut count_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
        let mut select_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM products WHERE 1=1");

        for qb in [&mut count_qb, &mut select_qb] {
            if let Some(category_id) = &query.category_id {
                qb.push(" AND category_id = ").push_bind(category_id.clone());
            }
            if let Some(search) = &query.search {
                qb.push(" AND name LIKE ")
                    .push_bind(format!("%{}%", search));
            }
        }

        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        select_qb
            .push(" ORDER BY name ASC LIMIT ")
            .push_bind(page_size as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let products = select_qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(
            total,
            page,
            returned = products.len(),
            "Listed products"
        );

        Ok(ProductPage {
            products,
            total,
            page,
            page_size,
        })
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(product_id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price_cents, stock,
                                  min_stock_level, category_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.min_stock_level)
        .bind(&product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a product's catalog fields, including stock.
    ///
    /// This is the admin path; it overwrites stock rather than adjusting it.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(product_id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, description = ?, price_cents = ?, stock = ?,
                min_stock_level = ?, category_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.min_stock_level)
        .bind(&product.category_id)
        .bind(product.updated_at)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(product_id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Lists products at or below their low-stock threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE stock <= min_stock_level ORDER BY stock ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}
