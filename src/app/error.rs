//! Application errors

use std::fmt;

use thiserror::Error;

use crate::{
    backend::BackendError,
    cart::CartError,
    checkout::CheckoutError,
    products::{ProductFormError, ProductId},
};

/// How a failure is presented to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was refused before reaching the backend.
    Validation,

    /// The backend could not be reached or rejected the request.
    Network,

    /// The operator is not logged in or the login was refused.
    Auth,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::Network => "network error",
            ErrorKind::Auth => "authentication error",
        })
    }
}

/// Errors returned by [`App::dispatch`](super::App::dispatch).
///
/// None of these are fatal; the store is left as it was before the failed command.
#[derive(Debug, Error)]
pub enum AppError {
    /// A command other than login was issued without a session.
    #[error("please log in first")]
    NotLoggedIn,

    /// The backend refused the credentials.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The product is not in the catalog.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),

    /// No sale has the given invoice number.
    #[error("no sale with invoice #{0}")]
    UnknownInvoice(String),

    /// A product save was attempted with no editor open.
    #[error("product editor is not open")]
    EditorClosed,

    /// Cart change refused.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Checkout refused or failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Product form is incomplete or invalid.
    #[error(transparent)]
    ProductForm(#[from] ProductFormError),

    /// Backend request failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AppError {
    /// Category of the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotLoggedIn | AppError::InvalidCredentials => ErrorKind::Auth,
            AppError::Backend(_) | AppError::Checkout(CheckoutError::Submission(_)) => {
                ErrorKind::Network
            }
            AppError::UnknownProduct(_)
            | AppError::UnknownInvoice(_)
            | AppError::EditorClosed
            | AppError::Cart(_)
            | AppError::Checkout(_)
            | AppError::ProductForm(_) => ErrorKind::Validation,
        }
    }
}
