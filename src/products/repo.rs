use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Catalog item. `title`, `description` and `img` are each unique across the
/// whole catalog, enforced by the store's unique indexes.
///
/// Wire names `desc` and `img` are kept for client compatibility.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "desc")]
    #[sqlx(rename = "description")]
    pub description: String,
    pub img: String,
    pub price: Option<f64>,
    pub categories: Vec<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const PRODUCT_COLUMNS: &str =
    "id, title, description, img, price, categories, size, color, created_at, updated_at";

/// Fields of a partial update; `None` leaves the stored value untouched.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub img: Option<String>,
    pub price: Option<f64>,
    pub categories: Option<Vec<String>>,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl Product {
    pub async fn insert(
        db: &PgPool,
        title: &str,
        description: &str,
        img: &str,
        price: Option<f64>,
        categories: &[String],
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (title, description, img, price, categories, size, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(description)
        .bind(img)
        .bind(price)
        .bind(categories)
        .bind(size)
        .bind(color)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// All products in store order, newest first. No pagination.
    pub async fn list_all(db: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await
    }

    /// Partial update in a single statement, so a miss never writes anything.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                img = COALESCE($4, img),
                price = COALESCE($5, price),
                categories = COALESCE($6, categories),
                size = COALESCE($7, size),
                color = COALESCE($8, color),
                updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.img)
        .bind(patch.price)
        .bind(patch.categories)
        .bind(patch.size)
        .bind(patch.color)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
