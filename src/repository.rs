use crate::{
    acl::Role,
    error::{AppError, AppResult},
    models::{
        Category, CategoryItem, CategorySearchHit, CategoryTree, CoverItem,
        CreateCategoryItemRequest, CreateCategoryRequest, CreateCoverRequest,
        CreateProductRequest, CreateSellingLinkRequest, NewProfile, Product, ProductImage,
        ProductWithImages, Profile, ProfileToken, ProfileTokenSummary, SearchKind, SellingLink,
        SellingLinkWithTargets, UpdateCategoryItemRequest, UpdateCategoryRequest,
        UpdateCoverRequest, UpdateProductRequest, UpdateProfileRequest, UpdateSellingLinkRequest,
    },
    pagination::Pagination,
};
use async_trait::async_trait;
use sqlx::{Encode, PgPool, Postgres, Transaction, Type, query_builder::QueryBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// UserFilter
///
/// Optional filters of the users listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring of `nome`.
    pub search: Option<String>,
    pub role: Option<Role>,
}

/// Repository
///
/// Every read and write the backoffice performs against the hosted database. Handlers only
/// see this trait so they can be exercised against an in-memory implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Profiles ---
    async fn get_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>>;
    async fn list_profiles(
        &self,
        filter: &UserFilter,
        page: &Pagination,
    ) -> AppResult<(Vec<Profile>, i64)>;
    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> AppResult<Option<Profile>>;
    async fn delete_profile(&self, user_id: Uuid) -> AppResult<bool>;
    /// Profiles with role `expert` whose name contains `query`.
    async fn search_experts(&self, query: &str, limit: i64) -> AppResult<Vec<Profile>>;

    // --- Profile tokens ---
    async fn list_tokens(&self, profile_id: Uuid) -> AppResult<Vec<ProfileTokenSummary>>;
    async fn create_token(&self, profile_id: Uuid, nome: &str, token: &str)
    -> AppResult<ProfileToken>;
    /// Owner-only: deletes nothing when the token belongs to another profile.
    async fn delete_token(&self, id: i64, profile_id: Uuid) -> AppResult<bool>;
    async fn find_token(&self, token: &str) -> AppResult<Option<ProfileToken>>;

    // --- Products ---
    async fn list_products(
        &self,
        profile_id: Uuid,
        page: &Pagination,
    ) -> AppResult<(Vec<ProductWithImages>, i64)>;
    async fn get_product(&self, id: i64) -> AppResult<Option<ProductWithImages>>;
    async fn create_product(
        &self,
        profile_id: Uuid,
        req: CreateProductRequest,
    ) -> AppResult<ProductWithImages>;
    async fn update_product(
        &self,
        id: i64,
        req: UpdateProductRequest,
    ) -> AppResult<Option<ProductWithImages>>;
    async fn delete_product_images(&self, product_id: i64) -> AppResult<u64>;
    async fn delete_product(&self, id: i64) -> AppResult<bool>;

    // --- Categories ---
    async fn list_categories(&self) -> AppResult<CategoryTree>;
    async fn create_category(&self, req: CreateCategoryRequest) -> AppResult<Category>;
    async fn update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> AppResult<Option<Category>>;
    async fn delete_category(&self, id: i64) -> AppResult<bool>;
    async fn create_category_item(&self, req: CreateCategoryItemRequest)
    -> AppResult<CategoryItem>;
    async fn update_category_item(
        &self,
        id: i64,
        req: UpdateCategoryItemRequest,
    ) -> AppResult<Option<CategoryItem>>;
    async fn get_category_item(&self, id: i64) -> AppResult<Option<CategoryItem>>;
    async fn delete_category_item(&self, id: i64) -> AppResult<bool>;
    async fn search_categories(&self, query: &str, limit: i64)
    -> AppResult<Vec<CategorySearchHit>>;

    // --- Cover ---
    async fn list_cover(&self) -> AppResult<Vec<CoverItem>>;
    async fn get_cover(&self, id: i64) -> AppResult<Option<CoverItem>>;
    /// Appends at the end of the manual order.
    async fn create_cover(&self, req: CreateCoverRequest) -> AppResult<CoverItem>;
    async fn update_cover(&self, id: i64, req: UpdateCoverRequest)
    -> AppResult<Option<CoverItem>>;
    async fn delete_cover(&self, id: i64) -> AppResult<bool>;
    /// Sets `order` to each id's index. Every id must exist.
    async fn reorder_cover(&self, ids: &[i64]) -> AppResult<()>;

    // --- Selling links ---
    async fn list_selling_links(&self) -> AppResult<Vec<SellingLinkWithTargets>>;
    async fn get_selling_link(&self, id: i64) -> AppResult<Option<SellingLinkWithTargets>>;
    async fn create_selling_link(
        &self,
        req: CreateSellingLinkRequest,
    ) -> AppResult<SellingLinkWithTargets>;
    async fn update_selling_link(
        &self,
        id: i64,
        req: UpdateSellingLinkRequest,
    ) -> AppResult<Option<SellingLinkWithTargets>>;
    async fn delete_selling_link(&self, id: i64) -> AppResult<bool>;
}

pub type RepositoryState = Arc<dyn Repository>;

/// Escapes `%`, `_` and `\` so user input matches literally inside an ILIKE pattern.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// PartialUpdate
///
/// `UPDATE .. SET` built from the fields a partial update actually carries. Each present
/// field becomes one bound assignment, so an explicit `null` clears its column.
struct PartialUpdate<'args> {
    builder: QueryBuilder<'args, Postgres>,
    assignments: usize,
}

impl<'args> PartialUpdate<'args> {
    fn new(table: &str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {table} SET ")),
            assignments: 0,
        }
    }

    fn next_assignment(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        if self.assignments > 0 {
            self.builder.push(", ");
        }
        self.assignments += 1;
        &mut self.builder
    }

    /// `column = value`, only when the field was sent.
    fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        if let Some(value) = value {
            self.next_assignment()
                .push(column)
                .push(" = ")
                .push_bind(value);
        }
        self
    }

    /// Unconditional assignment, e.g. `updated_at = now()`.
    fn touch(&mut self, assignment: &str) -> &mut Self {
        self.next_assignment().push(assignment);
        self
    }

    /// Closes the statement on `key_column = key`. An empty patch still returns the row
    /// when it exists.
    fn finish<K>(
        mut self,
        key_column: &str,
        key: K,
        returning: &str,
    ) -> QueryBuilder<'args, Postgres>
    where
        K: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        if self.assignments == 0 {
            self.builder.push(format!("{key_column} = {key_column}"));
        }
        self.builder
            .push(format!(" WHERE {key_column} = "))
            .push_bind(key)
            .push(format!(" RETURNING {returning}"));
        self.builder
    }
}

const PROFILE_COLUMNS: &str = "id, user_id, nome, bio, role, img_url, created_at, updated_at";
const PRODUCT_COLUMNS: &str = "id, name, description, price, price_currency, selling_url, \
     fee_perc, profile_id, created_at, edited_at";
const COVER_COLUMNS: &str = r#"id, name, image_url, is_public, product_id, "order""#;
const ITEM_COLUMNS: &str = "id, category_id, name, description, image_url, is_public";
const LINK_COLUMNS: &str = "id, name, link, descrizione, img_url, calltoaction";

/// PostgresRepository
///
/// `Repository` backed by the hosted Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_profile_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
        builder.push(" WHERE true");
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            builder.push(" AND nome ILIKE ");
            builder.push_bind(like_pattern(search.trim()));
        }
        if let Some(role) = filter.role {
            builder.push(" AND role = ");
            builder.push_bind(role.as_str());
        }
    }

    async fn images_for(&self, product_ids: &[i64]) -> AppResult<HashMap<i64, Vec<ProductImage>>> {
        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT id, product_id, img_url FROM product_images \
             WHERE product_id = ANY($1) ORDER BY id",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<ProductImage>> = HashMap::new();
        for image in images {
            grouped.entry(image.product_id).or_default().push(image);
        }
        Ok(grouped)
    }

    async fn insert_images(
        tx: &mut Transaction<'_, Postgres>,
        product_id: i64,
        urls: &[String],
    ) -> AppResult<()> {
        if urls.is_empty() {
            return Ok(());
        }
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO product_images (product_id, img_url) ");
        builder.push_values(urls, |mut row, url| {
            row.push_bind(product_id).push_bind(url);
        });
        builder.build().execute(&mut **tx).await?;
        Ok(())
    }

    async fn link_targets(
        &self,
        ids: &[i64],
    ) -> AppResult<(HashMap<i64, Vec<i64>>, HashMap<i64, Vec<i64>>)> {
        let categories = sqlx::query_as::<_, (i64, i64)>(
            "SELECT selling_link_id, category_id FROM selling_link_categories \
             WHERE selling_link_id = ANY($1) ORDER BY category_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        let items = sqlx::query_as::<_, (i64, i64)>(
            "SELECT selling_link_id, item_id FROM selling_link_items \
             WHERE selling_link_id = ANY($1) ORDER BY item_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let group = |pairs: Vec<(i64, i64)>| {
            let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
            for (link_id, target) in pairs {
                map.entry(link_id).or_default().push(target);
            }
            map
        };
        Ok((group(categories), group(items)))
    }

    async fn replace_link_targets(
        tx: &mut Transaction<'_, Postgres>,
        link_id: i64,
        category_ids: Option<&[i64]>,
        item_ids: Option<&[i64]>,
    ) -> AppResult<()> {
        if let Some(category_ids) = category_ids {
            sqlx::query("DELETE FROM selling_link_categories WHERE selling_link_id = $1")
                .bind(link_id)
                .execute(&mut **tx)
                .await?;
            if !category_ids.is_empty() {
                sqlx::query(
                    "INSERT INTO selling_link_categories (selling_link_id, category_id) \
                     SELECT $1, UNNEST($2::bigint[])",
                )
                .bind(link_id)
                .bind(category_ids)
                .execute(&mut **tx)
                .await?;
            }
        }
        if let Some(item_ids) = item_ids {
            sqlx::query("DELETE FROM selling_link_items WHERE selling_link_id = $1")
                .bind(link_id)
                .execute(&mut **tx)
                .await?;
            if !item_ids.is_empty() {
                sqlx::query(
                    "INSERT INTO selling_link_items (selling_link_id, item_id) \
                     SELECT $1, UNNEST($2::bigint[])",
                )
                .bind(link_id)
                .bind(item_ids)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn list_profiles(
        &self,
        filter: &UserFilter,
        page: &Pagination,
    ) -> AppResult<(Vec<Profile>, i64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM profiles");
        Self::push_profile_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROFILE_COLUMNS} FROM profiles"));
        Self::push_profile_filters(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(page.limit());
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let profiles = builder
            .build_query_as::<Profile>()
            .fetch_all(&self.pool)
            .await?;
        Ok((profiles, total))
    }

    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let created = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (id, user_id, nome, bio, role) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(profile.user_id)
        .bind(profile.nome)
        .bind(profile.bio)
        .bind(profile.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> AppResult<Option<Profile>> {
        let mut update = PartialUpdate::new("profiles");
        update
            .set("nome", req.nome.map(|n| n.trim().to_string()))
            .set("bio", req.bio)
            .set("role", req.role.map(|r| r.as_str()))
            .set("img_url", req.img_url)
            .touch("updated_at = now()");
        let updated = update
            .finish("user_id", user_id, PROFILE_COLUMNS)
            .build_query_as::<Profile>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_profile(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_experts(&self, query: &str, limit: i64) -> AppResult<Vec<Profile>> {
        let experts = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role = $1 AND nome ILIKE $2 \
             ORDER BY nome LIMIT $3"
        ))
        .bind(Role::Expert.as_str())
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(experts)
    }

    async fn list_tokens(&self, profile_id: Uuid) -> AppResult<Vec<ProfileTokenSummary>> {
        let tokens = sqlx::query_as::<_, ProfileTokenSummary>(
            "SELECT id, profile_id, nome, created_at FROM profile_tokens \
             WHERE profile_id = $1 ORDER BY created_at DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tokens)
    }

    async fn create_token(
        &self,
        profile_id: Uuid,
        nome: &str,
        token: &str,
    ) -> AppResult<ProfileToken> {
        let created = sqlx::query_as::<_, ProfileToken>(
            "INSERT INTO profile_tokens (profile_id, nome, token) VALUES ($1, $2, $3) \
             RETURNING id, profile_id, nome, token, created_at",
        )
        .bind(profile_id)
        .bind(nome)
        .bind(token)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn delete_token(&self, id: i64, profile_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM profile_tokens WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_token(&self, token: &str) -> AppResult<Option<ProfileToken>> {
        let found = sqlx::query_as::<_, ProfileToken>(
            "SELECT id, profile_id, nome, token, created_at FROM profile_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn list_products(
        &self,
        profile_id: Uuid,
        page: &Pagination,
    ) -> AppResult<(Vec<ProductWithImages>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE profile_id = $1")
                .bind(profile_id)
                .fetch_one(&self.pool)
                .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE profile_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(profile_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let mut images = self.images_for(&ids).await?;
        let items = products
            .into_iter()
            .map(|product| ProductWithImages {
                images: images.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect();
        Ok((items, total))
    }

    async fn get_product(&self, id: i64) -> AppResult<Option<ProductWithImages>> {
        let Some(product) = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let images = self
            .images_for(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(ProductWithImages { product, images }))
    }

    async fn create_product(
        &self,
        profile_id: Uuid,
        req: CreateProductRequest,
    ) -> AppResult<ProductWithImages> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, price_currency, selling_url, \
             fee_perc, profile_id) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.price)
        .bind(&req.price_currency)
        .bind(&req.selling_url)
        .bind(req.fee_perc)
        .bind(profile_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_images(&mut tx, product.id, &req.images).await?;
        tx.commit().await?;

        self.get_product(product.id)
            .await?
            .ok_or(AppError::NotFound("Product"))
    }

    async fn update_product(
        &self,
        id: i64,
        req: UpdateProductRequest,
    ) -> AppResult<Option<ProductWithImages>> {
        let mut tx = self.pool.begin().await?;

        let mut update = PartialUpdate::new("products");
        update
            .set("name", req.name)
            .set("description", req.description)
            .set("price", req.price)
            .set("price_currency", req.price_currency)
            .set("selling_url", req.selling_url)
            .set("fee_perc", req.fee_perc)
            .touch("edited_at = now()");
        let updated = update
            .finish("id", id, PRODUCT_COLUMNS)
            .build_query_as::<Product>()
            .fetch_optional(&mut *tx)
            .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(images) = &req.images {
            sqlx::query("DELETE FROM product_images WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_images(&mut tx, id, images).await?;
        }
        tx.commit().await?;

        self.get_product(id).await
    }

    async fn delete_product_images(&self, product_id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_product(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_categories(&self) -> AppResult<CategoryTree> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, is_public FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        let items = sqlx::query_as::<_, CategoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM category_items ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(CategoryTree::build(categories, items))
    }

    async fn create_category(&self, req: CreateCategoryRequest) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, is_public) VALUES ($1, $2) RETURNING id, name, is_public",
        )
        .bind(req.name.trim())
        .bind(req.is_public)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> AppResult<Option<Category>> {
        let mut update = PartialUpdate::new("categories");
        update
            .set("name", req.name.map(|n| n.trim().to_string()))
            .set("is_public", req.is_public);
        let category = update
            .finish("id", id, "id, name, is_public")
            .build_query_as::<Category>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn delete_category(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        // Items survive their category.
        sqlx::query("UPDATE category_items SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM selling_link_categories WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_category_item(
        &self,
        req: CreateCategoryItemRequest,
    ) -> AppResult<CategoryItem> {
        let item = sqlx::query_as::<_, CategoryItem>(&format!(
            "INSERT INTO category_items (category_id, name, description, image_url, is_public) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(req.category_id)
        .bind(req.name.trim())
        .bind(req.description)
        .bind(req.image_url)
        .bind(req.is_public)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update_category_item(
        &self,
        id: i64,
        req: UpdateCategoryItemRequest,
    ) -> AppResult<Option<CategoryItem>> {
        let mut update = PartialUpdate::new("category_items");
        update
            .set("category_id", req.category_id)
            .set("name", req.name.map(|n| n.trim().to_string()))
            .set("description", req.description)
            .set("image_url", req.image_url)
            .set("is_public", req.is_public);
        let item = update
            .finish("id", id, ITEM_COLUMNS)
            .build_query_as::<CategoryItem>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn get_category_item(&self, id: i64) -> AppResult<Option<CategoryItem>> {
        let item = sqlx::query_as::<_, CategoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM category_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn delete_category_item(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM selling_link_items WHERE item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM category_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_categories(
        &self,
        query: &str,
        limit: i64,
    ) -> AppResult<Vec<CategorySearchHit>> {
        let pattern = like_pattern(query);
        let categories = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, name FROM categories WHERE name ILIKE $1 ORDER BY name LIMIT $2",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        let items = sqlx::query_as::<_, (i64, String, Option<i64>)>(
            "SELECT id, name, category_id FROM category_items WHERE name ILIKE $1 \
             ORDER BY name LIMIT $2",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let hits = categories
            .into_iter()
            .map(|(id, name)| CategorySearchHit {
                kind: SearchKind::Category,
                id,
                name,
                category_id: None,
            })
            .chain(items.into_iter().map(|(id, name, category_id)| CategorySearchHit {
                kind: SearchKind::Item,
                id,
                name,
                category_id,
            }))
            .take(limit as usize)
            .collect();
        Ok(hits)
    }

    async fn list_cover(&self) -> AppResult<Vec<CoverItem>> {
        let cover = sqlx::query_as::<_, CoverItem>(&format!(
            r#"SELECT {COVER_COLUMNS} FROM cover ORDER BY "order", id"#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(cover)
    }

    async fn get_cover(&self, id: i64) -> AppResult<Option<CoverItem>> {
        let cover = sqlx::query_as::<_, CoverItem>(&format!(
            "SELECT {COVER_COLUMNS} FROM cover WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cover)
    }

    async fn create_cover(&self, req: CreateCoverRequest) -> AppResult<CoverItem> {
        let cover = sqlx::query_as::<_, CoverItem>(&format!(
            r#"INSERT INTO cover (name, image_url, is_public, product_id, "order")
               VALUES ($1, $2, $3, $4, (SELECT COALESCE(MAX("order"), -1) + 1 FROM cover))
               RETURNING {COVER_COLUMNS}"#
        ))
        .bind(req.name.trim())
        .bind(req.image_url)
        .bind(req.is_public)
        .bind(req.product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(cover)
    }

    async fn update_cover(
        &self,
        id: i64,
        req: UpdateCoverRequest,
    ) -> AppResult<Option<CoverItem>> {
        let mut update = PartialUpdate::new("cover");
        update
            .set("name", req.name.map(|n| n.trim().to_string()))
            .set("image_url", req.image_url)
            .set("is_public", req.is_public)
            .set("product_id", req.product_id);
        let cover = update
            .finish("id", id, COVER_COLUMNS)
            .build_query_as::<CoverItem>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(cover)
    }

    async fn delete_cover(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cover WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_cover(&self, ids: &[i64]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cover WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&mut *tx)
            .await?;
        if known != ids.len() as i64 {
            return Err(AppError::Validation(
                "Reorder list contains unknown or duplicate cover ids".to_string(),
            ));
        }

        for (position, id) in ids.iter().enumerate() {
            sqlx::query(r#"UPDATE cover SET "order" = $2 WHERE id = $1"#)
                .bind(id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_selling_links(&self) -> AppResult<Vec<SellingLinkWithTargets>> {
        let links = sqlx::query_as::<_, SellingLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM selling_links ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = links.iter().map(|l| l.id).collect();
        let (mut categories, mut items) = self.link_targets(&ids).await?;
        Ok(links
            .into_iter()
            .map(|link| SellingLinkWithTargets {
                category_ids: categories.remove(&link.id).unwrap_or_default(),
                item_ids: items.remove(&link.id).unwrap_or_default(),
                link,
            })
            .collect())
    }

    async fn get_selling_link(&self, id: i64) -> AppResult<Option<SellingLinkWithTargets>> {
        let Some(link) = sqlx::query_as::<_, SellingLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM selling_links WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let (mut categories, mut items) = self.link_targets(&[id]).await?;
        Ok(Some(SellingLinkWithTargets {
            category_ids: categories.remove(&id).unwrap_or_default(),
            item_ids: items.remove(&id).unwrap_or_default(),
            link,
        }))
    }

    async fn create_selling_link(
        &self,
        req: CreateSellingLinkRequest,
    ) -> AppResult<SellingLinkWithTargets> {
        let mut tx = self.pool.begin().await?;
        let link = sqlx::query_as::<_, SellingLink>(&format!(
            "INSERT INTO selling_links (name, link, descrizione, img_url, calltoaction) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {LINK_COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(&req.link)
        .bind(&req.descrizione)
        .bind(&req.img_url)
        .bind(&req.calltoaction)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_link_targets(
            &mut tx,
            link.id,
            Some(req.category_ids.as_slice()),
            Some(req.item_ids.as_slice()),
        )
        .await?;
        tx.commit().await?;

        self.get_selling_link(link.id)
            .await?
            .ok_or(AppError::NotFound("Selling link"))
    }

    async fn update_selling_link(
        &self,
        id: i64,
        req: UpdateSellingLinkRequest,
    ) -> AppResult<Option<SellingLinkWithTargets>> {
        let mut tx = self.pool.begin().await?;
        let mut update = PartialUpdate::new("selling_links");
        update
            .set("name", req.name.map(|n| n.trim().to_string()))
            .set("link", req.link)
            .set("descrizione", req.descrizione)
            .set("img_url", req.img_url)
            .set("calltoaction", req.calltoaction);
        let updated = update
            .finish("id", id, LINK_COLUMNS)
            .build_query_as::<SellingLink>()
            .fetch_optional(&mut *tx)
            .await?;

        if updated.is_none() {
            return Ok(None);
        }

        Self::replace_link_targets(
            &mut tx,
            id,
            req.category_ids.as_deref(),
            req.item_ids.as_deref(),
        )
        .await?;
        tx.commit().await?;

        self.get_selling_link(id).await
    }

    async fn delete_selling_link(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM selling_link_categories WHERE selling_link_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM selling_link_items WHERE selling_link_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM selling_links WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
