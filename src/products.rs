//! Products

use std::{convert::Infallible, fmt, num::ParseIntError, path::Path, str::FromStr};

use reqwest::Url;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stock level below which a product is flagged for attention.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Image shown for products without one of their own.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/100";

/// Backend-assigned product identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// Product category.
///
/// Unknown categories coming from the backend are kept verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Prepared food
    Food,
    /// Drinks
    Beverages,
    /// Packaged snacks
    Snacks,
    /// Groceries and staples
    Grocery,
    /// Electronics and accessories
    Electronics,
    /// Office and school supplies
    Stationery,
    /// Any other category name
    Other(String),
}

impl Category {
    /// Known categories, in menu order.
    pub const KNOWN: [Category; 6] = [
        Category::Food,
        Category::Beverages,
        Category::Snacks,
        Category::Grocery,
        Category::Electronics,
        Category::Stationery,
    ];

    /// Display name, as stored by the backend.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Beverages => "Beverages",
            Category::Snacks => "Snacks",
            Category::Grocery => "Grocery",
            Category::Electronics => "Electronics",
            Category::Stationery => "Stationery",
            Category::Other(name) => name,
        }
    }

    /// Lowercase key used to style the category badge.
    pub fn badge(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::KNOWN
            .into_iter()
            .find(|known| known.as_str().eq_ignore_ascii_case(value.trim()))
            .unwrap_or(Category::Other(value))
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product category
    pub category: Category,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Units in stock
    pub stock: u32,

    /// Image reference, absolute once resolved against the backend origin
    #[serde(default, rename = "img", alias = "image")]
    pub image: Option<String>,
}

impl Product {
    /// Whether stock has fallen below [`LOW_STOCK_THRESHOLD`].
    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    /// Whether the product can no longer be sold.
    pub fn is_sold_out(&self) -> bool {
        self.stock == 0
    }

    /// Image to display, falling back to [`PLACEHOLDER_IMAGE`].
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Resolve an image reference against the backend origin.
///
/// Absolute `http(s)` references are returned unchanged; anything else is treated as a path
/// from the origin root (`/static/uploads/x.png` on `http://host:5000/api` becomes
/// `http://host:5000/static/uploads/x.png`). Returns `None` if the reference cannot be joined.
pub fn resolve_image(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();

    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Some(reference.to_string());
    }

    let path = if reference.starts_with('/') {
        reference.to_string()
    } else {
        format!("/{reference}")
    };

    base.join(&path).ok().map(String::from)
}

/// Errors raised while assembling a product form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductFormError {
    /// A field required to create a product was not supplied.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The product name was blank.
    #[error("product name cannot be empty")]
    EmptyName,

    /// The price was negative.
    #[error("price cannot be negative")]
    NegativePrice,
}

/// Image file attached to a product form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name sent with the multipart part
    pub file_name: String,

    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());

        Ok(Self { file_name, bytes })
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Complete set of fields sent when creating or updating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    /// Product name
    pub name: String,

    /// Product category
    pub category: Category,

    /// Unit price
    pub price: Decimal,

    /// Units in stock
    pub stock: u32,

    /// Optional replacement image
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Form pre-filled from an existing product (without an image upload).
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: product.stock,
            image: None,
        }
    }

    /// Build a form for a new product from a draft; every field but the image is required.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductFormError`] for missing or invalid fields.
    pub fn from_draft(draft: ProductDraft) -> Result<Self, ProductFormError> {
        let form = Self {
            name: draft.name.ok_or(ProductFormError::MissingField("name"))?,
            category: draft
                .category
                .ok_or(ProductFormError::MissingField("category"))?,
            price: draft.price.ok_or(ProductFormError::MissingField("price"))?,
            stock: draft.stock.ok_or(ProductFormError::MissingField("stock"))?,
            image: draft.image,
        };

        form.validate()?;

        Ok(form)
    }

    /// Overwrite fields with the ones set in `draft`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductFormError`] if the result is invalid.
    pub fn apply(&mut self, draft: ProductDraft) -> Result<(), ProductFormError> {
        let mut updated = self.clone();

        if let Some(name) = draft.name {
            updated.name = name;
        }
        if let Some(category) = draft.category {
            updated.category = category;
        }
        if let Some(price) = draft.price {
            updated.price = price;
        }
        if let Some(stock) = draft.stock {
            updated.stock = stock;
        }
        if draft.image.is_some() {
            updated.image = draft.image;
        }

        updated.validate()?;
        *self = updated;

        Ok(())
    }

    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductFormError`] for a blank name or a negative price.
    pub fn validate(&self) -> Result<(), ProductFormError> {
        if self.name.trim().is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(ProductFormError::NegativePrice);
        }

        Ok(())
    }
}

/// Partial product fields, as entered by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    /// Product name
    pub name: Option<String>,

    /// Product category
    pub category: Option<Category>,

    /// Unit price
    pub price: Option<Decimal>,

    /// Units in stock
    pub stock: Option<u32>,

    /// Image to upload
    pub image: Option<ImageUpload>,
}
