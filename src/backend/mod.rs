//! Backend
//!
//! The point-of-sale backend owns authentication, persistence and image storage; this module is
//! the only place the client talks to it. [`Backend`] is the seam the rest of the crate depends
//! on, and [`HttpBackend`] is the REST implementation.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::{
    checkout::CheckoutRequest,
    products::{Product, ProductForm, ProductId},
    sales::{Sale, Stats},
};

mod http;

pub use http::HttpBackend;

/// Errors that can occur when communicating with the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The configured base URL could not be parsed.
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidUrl {
        /// URL as configured
        url: String,
        /// Parser message
        reason: String,
    },

    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// Response status
        status: StatusCode,
        /// Response body, for diagnostics
        body: String,
    },
}

impl BackendError {
    /// Status code of a rejected request, if the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Http(source) => source.status(),
            BackendError::InvalidUrl { .. } => None,
        }
    }
}

/// Operator login details.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Operator user name
    pub username: String,

    /// Operator password
    pub password: String,
}

impl Credentials {
    /// Bundle a user name and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Operations offered by the point-of-sale backend.
#[automock]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Check operator credentials.
    async fn login(&self, credentials: &Credentials) -> Result<(), BackendError>;

    /// Retrieves all products.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Creates a new product.
    async fn create_product(&self, form: &ProductForm) -> Result<Product, BackendError>;

    /// Replaces the fields of an existing product.
    async fn update_product(
        &self,
        product: ProductId,
        form: &ProductForm,
    ) -> Result<Product, BackendError>;

    /// Deletes a product.
    async fn delete_product(&self, product: ProductId) -> Result<(), BackendError>;

    /// Aggregate revenue and stock figures.
    async fn stats(&self) -> Result<Stats, BackendError>;

    /// Full sales history.
    async fn list_sales(&self) -> Result<Vec<Sale>, BackendError>;

    /// Records an order and returns the created sale.
    async fn checkout(&self, order: &CheckoutRequest) -> Result<Sale, BackendError>;
}
