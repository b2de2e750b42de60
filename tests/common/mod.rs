#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use chrono::Utc;
use ilpdg_backoffice::{
    AppConfig, AppState, MockIdentityService, MockStorageService,
    acl::Role,
    auth::{ACCESS_COOKIE, Claims},
    config::{Env, LOCAL_JWT_SECRET},
    create_router,
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
    repository::{Repository, UserFilter},
    storage::MOCK_PUBLIC_BASE,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::SystemTime,
};
use tower::ServiceExt;
use uuid::Uuid;

// --- In-memory repository ---

#[derive(Default)]
struct Tables {
    next_id: i64,
    profiles: Vec<Profile>,
    tokens: Vec<ProfileToken>,
    products: Vec<Product>,
    images: Vec<ProductImage>,
    categories: Vec<Category>,
    items: Vec<CategoryItem>,
    cover: Vec<CoverItem>,
    links: Vec<SellingLink>,
    link_categories: Vec<(i64, i64)>,
    link_items: Vec<(i64, i64)>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product(&self, id: i64) -> Option<ProductWithImages> {
        let product = self.products.iter().find(|p| p.id == id)?.clone();
        let images = self
            .images
            .iter()
            .filter(|i| i.product_id == id)
            .cloned()
            .collect();
        Some(ProductWithImages { product, images })
    }

    fn link(&self, id: i64) -> Option<SellingLinkWithTargets> {
        let link = self.links.iter().find(|l| l.id == id)?.clone();
        Some(SellingLinkWithTargets {
            link,
            category_ids: self
                .link_categories
                .iter()
                .filter(|(l, _)| *l == id)
                .map(|(_, c)| *c)
                .collect(),
            item_ids: self
                .link_items
                .iter()
                .filter(|(l, _)| *l == id)
                .map(|(_, i)| *i)
                .collect(),
        })
    }

    fn set_images(&mut self, product_id: i64, urls: Vec<String>) {
        self.images.retain(|i| i.product_id != product_id);
        for img_url in urls {
            let id = self.id();
            self.images.push(ProductImage {
                id,
                product_id,
                img_url,
            });
        }
    }
}

/// InMemoryRepository
///
/// `Repository` over plain vectors, so router tests run without Postgres.
#[derive(Default, Clone)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paginate<T: Clone>(rows: &[T], page: &Pagination) -> Vec<T> {
    rows.iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Seeds a profile and returns it.
    pub fn add_profile(&self, nome: &str, role: Option<Role>) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            nome: Some(nome.to_string()),
            bio: None,
            role_name: role.map(|r| r.as_str().to_string()),
            img_url: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.tables.lock().unwrap().profiles.push(profile.clone());
        profile
    }

    /// Seeds a raw role string, e.g. one the ACL does not know.
    pub fn add_profile_with_raw_role(&self, nome: &str, role: &str) -> Profile {
        let mut profile = self.add_profile(nome, None);
        profile.role_name = Some(role.to_string());
        let mut tables = self.tables.lock().unwrap();
        if let Some(p) = tables.profiles.iter_mut().find(|p| p.id == profile.id) {
            p.role_name = Some(role.to_string());
        }
        profile
    }

    pub fn add_token(&self, profile_id: Uuid, token: &str) -> ProfileToken {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.id();
        let row = ProfileToken {
            id,
            profile_id,
            nome: "sync".to_string(),
            token: token.to_string(),
            created_at: Utc::now(),
        };
        tables.tokens.push(row.clone());
        row
    }

    pub fn add_product(&self, profile_id: Uuid, name: &str, images: &[&str]) -> i64 {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.id();
        tables.products.push(Product {
            id,
            name: name.to_string(),
            price: 10.0,
            price_currency: "EUR".to_string(),
            profile_id,
            created_at: Utc::now(),
            ..Product::default()
        });
        tables.set_images(id, images.iter().map(|s| s.to_string()).collect());
        id
    }

    /// Replaces a product's images; for URLs that embed the product id.
    pub fn set_product_images(&self, product_id: i64, images: &[&str]) {
        let mut tables = self.tables.lock().unwrap();
        tables.set_images(product_id, images.iter().map(|s| s.to_string()).collect());
    }

    pub fn add_cover(&self, name: &str, image_url: &str, order: i32) -> i64 {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.id();
        tables.cover.push(CoverItem {
            id,
            name: name.to_string(),
            image_url: image_url.to_string(),
            is_public: true,
            product_id: None,
            order,
        });
        id
    }

    pub fn product_exists(&self, id: i64) -> bool {
        self.tables.lock().unwrap().products.iter().any(|p| p.id == id)
    }

    pub fn image_count(&self, product_id: i64) -> usize {
        self.tables
            .lock()
            .unwrap()
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .count()
    }

    pub fn profile_exists(&self, user_id: Uuid) -> bool {
        self.tables
            .lock()
            .unwrap()
            .profiles
            .iter()
            .any(|p| p.user_id == user_id)
    }

    pub fn link_pivots(&self, link_id: i64) -> (Vec<i64>, Vec<i64>) {
        let tables = self.tables.lock().unwrap();
        let link = tables.link(link_id).unwrap_or_default();
        (link.category_ids, link.item_ids)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self
            .lock()?
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn list_profiles(
        &self,
        filter: &UserFilter,
        page: &Pagination,
    ) -> AppResult<(Vec<Profile>, i64)> {
        let tables = self.lock()?;
        let rows: Vec<Profile> = tables
            .profiles
            .iter()
            .filter(|p| match filter.search.as_deref() {
                Some(q) => p.nome.as_deref().is_some_and(|n| contains_ci(n, q)),
                None => true,
            })
            .filter(|p| match filter.role {
                Some(role) => p.role() == Some(role),
                None => true,
            })
            .cloned()
            .collect();
        Ok((paginate(&rows, page), rows.len() as i64))
    }

    async fn create_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let row = Profile {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            nome: Some(profile.nome),
            bio: profile.bio,
            role_name: Some(profile.role.as_str().to_string()),
            img_url: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.lock()?.profiles.push(row.clone());
        Ok(row)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> AppResult<Option<Profile>> {
        let mut tables = self.lock()?;
        let Some(profile) = tables.profiles.iter_mut().find(|p| p.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(nome) = req.nome {
            profile.nome = Some(nome);
        }
        if let Some(bio) = req.bio {
            profile.bio = bio;
        }
        if let Some(role) = req.role {
            profile.role_name = Some(role.as_str().to_string());
        }
        if let Some(img_url) = req.img_url {
            profile.img_url = img_url;
        }
        profile.updated_at = Some(Utc::now());
        Ok(Some(profile.clone()))
    }

    async fn delete_profile(&self, user_id: Uuid) -> AppResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.user_id != user_id);
        Ok(tables.profiles.len() != before)
    }

    async fn search_experts(&self, query: &str, limit: i64) -> AppResult<Vec<Profile>> {
        Ok(self
            .lock()?
            .profiles
            .iter()
            .filter(|p| p.role() == Some(Role::Expert))
            .filter(|p| p.nome.as_deref().is_some_and(|n| contains_ci(n, query)))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_tokens(&self, profile_id: Uuid) -> AppResult<Vec<ProfileTokenSummary>> {
        Ok(self
            .lock()?
            .tokens
            .iter()
            .filter(|t| t.profile_id == profile_id)
            .cloned()
            .map(ProfileTokenSummary::from)
            .collect())
    }

    async fn create_token(
        &self,
        profile_id: Uuid,
        nome: &str,
        token: &str,
    ) -> AppResult<ProfileToken> {
        let mut tables = self.lock()?;
        let id = tables.id();
        let row = ProfileToken {
            id,
            profile_id,
            nome: nome.to_string(),
            token: token.to_string(),
            created_at: Utc::now(),
        };
        tables.tokens.push(row.clone());
        Ok(row)
    }

    async fn delete_token(&self, id: i64, profile_id: Uuid) -> AppResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.tokens.len();
        tables
            .tokens
            .retain(|t| !(t.id == id && t.profile_id == profile_id));
        Ok(tables.tokens.len() != before)
    }

    async fn find_token(&self, token: &str) -> AppResult<Option<ProfileToken>> {
        Ok(self.lock()?.tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn list_products(
        &self,
        profile_id: Uuid,
        page: &Pagination,
    ) -> AppResult<(Vec<ProductWithImages>, i64)> {
        let tables = self.lock()?;
        let rows: Vec<ProductWithImages> = tables
            .products
            .iter()
            .filter(|p| p.profile_id == profile_id)
            .filter_map(|p| tables.product(p.id))
            .collect();
        Ok((paginate(&rows, page), rows.len() as i64))
    }

    async fn get_product(&self, id: i64) -> AppResult<Option<ProductWithImages>> {
        Ok(self.lock()?.product(id))
    }

    async fn create_product(
        &self,
        profile_id: Uuid,
        req: CreateProductRequest,
    ) -> AppResult<ProductWithImages> {
        let mut tables = self.lock()?;
        let id = tables.id();
        tables.products.push(Product {
            id,
            name: req.name,
            description: req.description,
            price: req.price,
            price_currency: req.price_currency,
            selling_url: req.selling_url,
            fee_perc: req.fee_perc,
            profile_id,
            created_at: Utc::now(),
            edited_at: None,
        });
        tables.set_images(id, req.images);
        tables
            .product(id)
            .ok_or_else(|| AppError::Internal("lost product".to_string()))
    }

    async fn update_product(
        &self,
        id: i64,
        req: UpdateProductRequest,
    ) -> AppResult<Option<ProductWithImages>> {
        let mut tables = self.lock()?;
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            product.name = name;
        }
        if let Some(description) = req.description {
            product.description = description;
        }
        if let Some(price) = req.price {
            product.price = price;
        }
        if let Some(currency) = req.price_currency {
            product.price_currency = currency;
        }
        if let Some(url) = req.selling_url {
            product.selling_url = Some(url);
        }
        if let Some(fee) = req.fee_perc {
            product.fee_perc = Some(fee);
        }
        product.edited_at = Some(Utc::now());
        if let Some(images) = req.images {
            tables.set_images(id, images);
        }
        Ok(tables.product(id))
    }

    async fn delete_product_images(&self, product_id: i64) -> AppResult<u64> {
        let mut tables = self.lock()?;
        let before = tables.images.len();
        tables.images.retain(|i| i.product_id != product_id);
        Ok((before - tables.images.len()) as u64)
    }

    async fn delete_product(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() != before)
    }

    async fn list_categories(&self) -> AppResult<CategoryTree> {
        let tables = self.lock()?;
        Ok(CategoryTree::build(
            tables.categories.clone(),
            tables.items.clone(),
        ))
    }

    async fn create_category(&self, req: CreateCategoryRequest) -> AppResult<Category> {
        let mut tables = self.lock()?;
        let id = tables.id();
        let row = Category {
            id,
            name: req.name,
            is_public: req.is_public,
        };
        tables.categories.push(row.clone());
        Ok(row)
    }

    async fn update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> AppResult<Option<Category>> {
        let mut tables = self.lock()?;
        let Some(category) = tables.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            category.name = name;
        }
        if let Some(is_public) = req.is_public {
            category.is_public = is_public;
        }
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Ok(false);
        }
        for item in tables.items.iter_mut().filter(|i| i.category_id == Some(id)) {
            item.category_id = None;
        }
        tables.link_categories.retain(|(_, c)| *c != id);
        Ok(true)
    }

    async fn create_category_item(
        &self,
        req: CreateCategoryItemRequest,
    ) -> AppResult<CategoryItem> {
        let mut tables = self.lock()?;
        let id = tables.id();
        let row = CategoryItem {
            id,
            category_id: req.category_id,
            name: req.name,
            description: req.description,
            image_url: req.image_url,
            is_public: req.is_public,
        };
        tables.items.push(row.clone());
        Ok(row)
    }

    async fn update_category_item(
        &self,
        id: i64,
        req: UpdateCategoryItemRequest,
    ) -> AppResult<Option<CategoryItem>> {
        let mut tables = self.lock()?;
        let Some(item) = tables.items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(category_id) = req.category_id {
            item.category_id = category_id;
        }
        if let Some(name) = req.name {
            item.name = name;
        }
        if let Some(description) = req.description {
            item.description = description;
        }
        if let Some(image_url) = req.image_url {
            item.image_url = image_url;
        }
        if let Some(is_public) = req.is_public {
            item.is_public = is_public;
        }
        Ok(Some(item.clone()))
    }

    async fn get_category_item(&self, id: i64) -> AppResult<Option<CategoryItem>> {
        Ok(self.lock()?.items.iter().find(|i| i.id == id).cloned())
    }

    async fn delete_category_item(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.items.len();
        tables.items.retain(|i| i.id != id);
        tables.link_items.retain(|(_, i)| *i != id);
        Ok(tables.items.len() != before)
    }

    async fn search_categories(
        &self,
        query: &str,
        limit: i64,
    ) -> AppResult<Vec<CategorySearchHit>> {
        let tables = self.lock()?;
        let categories = tables
            .categories
            .iter()
            .filter(|c| contains_ci(&c.name, query))
            .map(|c| CategorySearchHit {
                kind: SearchKind::Category,
                id: c.id,
                name: c.name.clone(),
                category_id: None,
            });
        let items = tables
            .items
            .iter()
            .filter(|i| contains_ci(&i.name, query))
            .map(|i| CategorySearchHit {
                kind: SearchKind::Item,
                id: i.id,
                name: i.name.clone(),
                category_id: i.category_id,
            });
        Ok(categories.chain(items).take(limit as usize).collect())
    }

    async fn list_cover(&self) -> AppResult<Vec<CoverItem>> {
        let mut rows = self.lock()?.cover.clone();
        rows.sort_by_key(|c| (c.order, c.id));
        Ok(rows)
    }

    async fn get_cover(&self, id: i64) -> AppResult<Option<CoverItem>> {
        Ok(self.lock()?.cover.iter().find(|c| c.id == id).cloned())
    }

    async fn create_cover(&self, req: CreateCoverRequest) -> AppResult<CoverItem> {
        let mut tables = self.lock()?;
        let id = tables.id();
        let order = tables.cover.iter().map(|c| c.order).max().map_or(0, |m| m + 1);
        let row = CoverItem {
            id,
            name: req.name,
            image_url: req.image_url,
            is_public: req.is_public,
            product_id: req.product_id,
            order,
        };
        tables.cover.push(row.clone());
        Ok(row)
    }

    async fn update_cover(
        &self,
        id: i64,
        req: UpdateCoverRequest,
    ) -> AppResult<Option<CoverItem>> {
        let mut tables = self.lock()?;
        let Some(cover) = tables.cover.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            cover.name = name;
        }
        if let Some(image_url) = req.image_url {
            cover.image_url = image_url;
        }
        if let Some(is_public) = req.is_public {
            cover.is_public = is_public;
        }
        if let Some(product_id) = req.product_id {
            cover.product_id = product_id;
        }
        Ok(Some(cover.clone()))
    }

    async fn delete_cover(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.cover.len();
        tables.cover.retain(|c| c.id != id);
        Ok(tables.cover.len() != before)
    }

    async fn reorder_cover(&self, ids: &[i64]) -> AppResult<()> {
        let mut tables = self.lock()?;
        let known = ids
            .iter()
            .filter(|id| tables.cover.iter().any(|c| c.id == **id))
            .count();
        if known != ids.len() {
            return Err(AppError::Validation(
                "Reorder list contains unknown cover ids".to_string(),
            ));
        }
        for (index, id) in ids.iter().enumerate() {
            if let Some(cover) = tables.cover.iter_mut().find(|c| c.id == *id) {
                cover.order = index as i32;
            }
        }
        Ok(())
    }

    async fn list_selling_links(&self) -> AppResult<Vec<SellingLinkWithTargets>> {
        let tables = self.lock()?;
        Ok(tables
            .links
            .iter()
            .filter_map(|l| tables.link(l.id))
            .collect())
    }

    async fn get_selling_link(&self, id: i64) -> AppResult<Option<SellingLinkWithTargets>> {
        Ok(self.lock()?.link(id))
    }

    async fn create_selling_link(
        &self,
        req: CreateSellingLinkRequest,
    ) -> AppResult<SellingLinkWithTargets> {
        let mut tables = self.lock()?;
        let id = tables.id();
        tables.links.push(SellingLink {
            id,
            name: req.name,
            link: req.link,
            descrizione: req.descrizione,
            img_url: req.img_url,
            calltoaction: req.calltoaction,
        });
        for category_id in req.category_ids {
            tables.link_categories.push((id, category_id));
        }
        for item_id in req.item_ids {
            tables.link_items.push((id, item_id));
        }
        tables
            .link(id)
            .ok_or_else(|| AppError::Internal("lost link".to_string()))
    }

    async fn update_selling_link(
        &self,
        id: i64,
        req: UpdateSellingLinkRequest,
    ) -> AppResult<Option<SellingLinkWithTargets>> {
        let mut tables = self.lock()?;
        let Some(link) = tables.links.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            link.name = name;
        }
        if let Some(url) = req.link {
            link.link = url;
        }
        if let Some(descrizione) = req.descrizione {
            link.descrizione = descrizione;
        }
        if let Some(img_url) = req.img_url {
            link.img_url = img_url;
        }
        if let Some(cta) = req.calltoaction {
            link.calltoaction = cta;
        }
        if let Some(category_ids) = req.category_ids {
            tables.link_categories.retain(|(l, _)| *l != id);
            tables
                .link_categories
                .extend(category_ids.into_iter().map(|c| (id, c)));
        }
        if let Some(item_ids) = req.item_ids {
            tables.link_items.retain(|(l, _)| *l != id);
            tables.link_items.extend(item_ids.into_iter().map(|i| (id, i)));
        }
        Ok(tables.link(id))
    }

    async fn delete_selling_link(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.links.len();
        tables.links.retain(|l| l.id != id);
        tables.link_categories.retain(|(l, _)| *l != id);
        tables.link_items.retain(|(l, _)| *l != id);
        Ok(tables.links.len() != before)
    }
}

// --- App harness ---

/// TestApp
///
/// A router over the in-memory repository and the storage/identity mocks, with handles kept
/// for assertions.
pub struct TestApp {
    pub router: Router,
    pub repo: InMemoryRepository,
    pub storage: MockStorageService,
    pub identity: MockIdentityService,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_services(
            AppConfig::default(),
            MockStorageService::new(),
            MockIdentityService::new(),
        )
    }

    pub fn production() -> Self {
        let config = AppConfig {
            env: Env::Production,
            ..AppConfig::default()
        };
        Self::with_services(config, MockStorageService::new(), MockIdentityService::new())
    }

    pub fn with_services(
        config: AppConfig,
        storage: MockStorageService,
        identity: MockIdentityService,
    ) -> Self {
        let repo = InMemoryRepository::new();
        let state = AppState {
            repo: Arc::new(repo.clone()),
            storage: Arc::new(storage.clone()),
            identity: Arc::new(identity.clone()),
            config: config.clone(),
        };
        Self {
            router: create_router(state),
            repo,
            storage,
            identity,
            config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Signs a session JWT the way the hosted auth service does.
pub fn mint_jwt(user_id: Uuid, secret: &str, ttl_secs: i64) -> String {
    let now = now_secs() as i64;
    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + ttl_secs).max(0) as usize,
        email: Some("user@ilpdg.test".to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn session_jwt(user_id: Uuid) -> String {
    mint_jwt(user_id, LOCAL_JWT_SECRET, 3600)
}

/// Request builder carrying the session cookie of `user_id`.
pub fn as_user(method: &str, uri: &str, user_id: Uuid) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::COOKIE,
            format!("{ACCESS_COOKIE}={}", session_jwt(user_id)),
        )
}

pub fn json_body(value: Value) -> Body {
    Body::from(value.to_string())
}

pub fn with_json(builder: axum::http::request::Builder, value: Value) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(json_body(value))
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn media_url(key: &str) -> String {
    format!("{MOCK_PUBLIC_BASE}/{key}")
}
