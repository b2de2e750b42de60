use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{acl::Role, pagination::PageMeta};

/// Reads a clearable field of a partial update: absent stays `None`, an explicit `null`
/// becomes `Some(None)`. Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// --- Profiles ---

/// Profile
///
/// A backoffice user's record in `public.profiles`, linked one-to-one with the hosted
/// auth identity through `user_id`. `role` is kept as the raw column value; use
/// [`Profile::role`] to get the parsed role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nome: Option<String>,
    pub bio: Option<String>,
    #[sqlx(rename = "role")]
    #[serde(rename = "role")]
    pub role_name: Option<String>,
    pub img_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        Role::parse(self.role_name.as_deref())
    }
}

/// NewProfile
///
/// Row inserted right after the hosted auth user is created.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub nome: String,
    pub bio: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub nome: String,
    pub role: Role,
    #[validate(length(max = 1000, message = "Bio must be less than 1000 characters"))]
    pub bio: Option<String>,
}

/// UpdateProfileRequest
///
/// Partial profile update used by the user-management screen. Absent fields are untouched;
/// `null` clears `bio` or `img_url`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    #[validate(length(max = 1000, message = "Bio must be less than 1000 characters"))]
    pub bio: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    #[validate(url(message = "Invalid image URL"))]
    pub img_url: Option<Option<String>>,
}

/// UpdateMeRequest
///
/// Self-service profile edit. The role is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    #[validate(length(max = 1000, message = "Bio must be less than 1000 characters"))]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    #[validate(url(message = "Invalid image URL"))]
    pub img_url: Option<Option<String>>,
}

impl From<UpdateMeRequest> for UpdateProfileRequest {
    fn from(req: UpdateMeRequest) -> Self {
        Self {
            nome: req.nome,
            bio: req.bio,
            role: None,
            img_url: req.img_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfilePage {
    pub items: Vec<Profile>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ToggleStatusRequest {
    pub user_id: Uuid,
    /// `false` bans the auth user, `true` lifts the ban.
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

// --- Profile API tokens ---

/// ProfileToken
///
/// A bearer credential for the products sync API. The `token` value is only ever returned
/// by the create call.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct ProfileToken {
    pub id: i64,
    pub profile_id: Uuid,
    pub nome: String,
    pub token: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ProfileTokenSummary
///
/// Listing shape of a token, without the secret.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct ProfileTokenSummary {
    pub id: i64,
    pub profile_id: Uuid,
    pub nome: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<ProfileToken> for ProfileTokenSummary {
    fn from(token: ProfileToken) -> Self {
        Self {
            id: token.id,
            profile_id: token.profile_id,
            nome: token.nome,
            created_at: token.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateTokenRequest {
    #[validate(length(min = 1, max = 80, message = "Token name must be 1-80 characters"))]
    pub nome: String,
}

// --- Products ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub price_currency: String,
    pub selling_url: Option<String>,
    pub fee_perc: Option<f64>,
    pub profile_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub img_url: String,
}

/// ProductWithImages
///
/// A product joined with its image rows; the shape every products endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProductPage {
    pub items: Vec<ProductWithImages>,
    pub meta: PageMeta,
}

fn validate_currency(code: &str) -> Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency")
            .with_message("Currency must be a three-letter ISO code".into()))
    }
}

fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.iter().all(|url| validator::ValidateUrl::validate_url(url)) {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Every image must be a valid URL".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(custom(function = "validate_currency"))]
    pub price_currency: String,
    #[validate(url(message = "Invalid selling URL"))]
    pub selling_url: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "Fee must be between 0 and 100"))]
    pub fee_perc: Option<f64>,
    #[serde(default)]
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Vec<String>,
}

impl CreateProductRequest {
    pub fn normalized(mut self) -> Self {
        self.price_currency = self.price_currency.to_ascii_uppercase();
        self
    }
}

/// UpdateProductRequest
///
/// Partial product update. When `images` is present it replaces the whole image set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_currency"))]
    pub price_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid selling URL"))]
    pub selling_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0, message = "Fee must be between 0 and 100"))]
    pub fee_perc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

impl UpdateProductRequest {
    pub fn normalized(mut self) -> Self {
        self.price_currency = self.price_currency.map(|c| c.to_ascii_uppercase());
        self
    }
}

// --- Categories ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CategoryItem {
    pub id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryWithItems {
    #[serde(flatten)]
    pub category: Category,
    pub items: Vec<CategoryItem>,
}

/// CategoryTree
///
/// Everything the categories screen shows: categories with their items, plus the items
/// whose category was deleted or never set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategoryTree {
    pub categories: Vec<CategoryWithItems>,
    pub uncategorized: Vec<CategoryItem>,
}

impl CategoryTree {
    /// Groups flat rows into the tree. Category order is preserved; items keep their
    /// relative order inside each group.
    pub fn build(categories: Vec<Category>, items: Vec<CategoryItem>) -> Self {
        let mut tree = CategoryTree {
            categories: categories
                .into_iter()
                .map(|category| CategoryWithItems {
                    category,
                    items: Vec::new(),
                })
                .collect(),
            uncategorized: Vec::new(),
        };
        for item in items {
            let slot = item.category_id.and_then(|cid| {
                tree.categories
                    .iter_mut()
                    .find(|c| c.category.id == cid)
            });
            match slot {
                Some(group) => group.items.push(item),
                None => tree.uncategorized.push(item),
            }
        }
        tree
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateCategoryItemRequest {
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateCategoryItemRequest {
    /// `null` moves the item to the uncategorized group.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i64>)]
    #[ts(type = "number | null")]
    pub category_id: Option<Option<i64>>,
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<Option<String>>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SearchKind {
    Category,
    Item,
}

/// CategorySearchHit
///
/// One match of the category picker's type-ahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategorySearchHit {
    pub kind: SearchKind,
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
}

// --- Cover ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CoverItem {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub is_public: bool,
    pub product_id: Option<i64>,
    /// Manual sort key, ascending.
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateCoverRequest {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: String,
    #[serde(default)]
    pub is_public: bool,
    pub product_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateCoverRequest {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    pub is_public: Option<bool>,
    /// `null` detaches the cover from its product.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i64>)]
    #[ts(type = "number | null")]
    pub product_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReorderCoverRequest {
    /// Cover ids in their new display order.
    pub ids: Vec<i64>,
}

// --- Selling links ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct SellingLink {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub descrizione: Option<String>,
    pub img_url: Option<String>,
    pub calltoaction: Option<String>,
}

/// SellingLinkWithTargets
///
/// A selling link plus the categories and items it is attached to through the two pivot
/// tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SellingLinkWithTargets {
    #[serde(flatten)]
    pub link: SellingLink,
    pub category_ids: Vec<i64>,
    pub item_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateSellingLinkRequest {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(url(message = "Invalid link URL"))]
    pub link: String,
    pub descrizione: Option<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub img_url: Option<String>,
    #[validate(length(max = 60, message = "Call to action must be at most 60 characters"))]
    pub calltoaction: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub item_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateSellingLinkRequest {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(url(message = "Invalid link URL"))]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub descrizione: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    #[validate(url(message = "Invalid image URL"))]
    pub img_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    #[validate(length(max = 60, message = "Call to action must be at most 60 characters"))]
    pub calltoaction: Option<Option<String>>,
    /// Replaces the attached categories when present.
    pub category_ids: Option<Vec<i64>>,
    /// Replaces the attached items when present.
    pub item_ids: Option<Vec<i64>>,
}

// --- Session & navigation ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SetSessionRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub role: Option<Role>,
}

/// NavigationResponse
///
/// What the sidebar needs to render: who is signed in and the links their role can see.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationResponse {
    pub nome: Option<String>,
    pub img_url: Option<String>,
    pub role: Option<Role>,
    pub top: Vec<crate::acl::NavEntry>,
    pub bottom: Vec<crate::acl::NavEntry>,
}

// --- Uploads ---

/// UploadFolder
///
/// The storage key prefixes the UI uploads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum UploadFolder {
    Products,
    Cover,
    Profiles,
    SellingLinks,
    Categories,
}

impl UploadFolder {
    /// First key segment of every object uploaded into this folder.
    pub fn as_str(self) -> &'static str {
        match self {
            UploadFolder::Products => "products",
            UploadFolder::Cover => "cover",
            UploadFolder::Profiles => "profiles",
            UploadFolder::SellingLinks => "selling-links",
            UploadFolder::Categories => "categories",
        }
    }

    /// Key prefix a record's files live under. Products are further split by id.
    pub fn prefix(self, product_id: Option<i64>) -> String {
        match (self, product_id) {
            (UploadFolder::Products, Some(id)) => format!("products/{id}/"),
            (folder, _) => format!("{}/", folder.as_str()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS)]
#[ts(export)]
pub struct PresignedUrlRequest {
    pub folder: UploadFolder,
    /// Required when `folder` is `products`.
    pub product_id: Option<i64>,
    #[schema(example = "front.jpg")]
    pub filename: String,
    #[schema(example = "image/jpeg")]
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// Time-limited URL for the PUT request.
    pub upload_url: String,
    /// Object key inside the media bucket.
    pub resource_key: String,
    /// URL to store on the row once the upload completes.
    pub public_url: String,
}
