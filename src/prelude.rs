//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    app::{App, AppError, Command, EditorMode, ErrorKind, ProductEditor, Session, View},
    backend::{Backend, BackendError, Credentials, HttpBackend},
    cart::{Cart, CartError, CartLine, QuantityDelta},
    catalog::Catalog,
    checkout::{Checkout, CheckoutError, CheckoutState, CustomerDetails, PaymentMethod},
    config::{BackendConfig, Config, CurrencyCode},
    notifications::{Level, Notification, Notifications},
    pricing::{PricingError, TAX_RATE, Totals},
    products::{
        Category, ImageUpload, Product, ProductDraft, ProductForm, ProductFormError, ProductId,
    },
    receipt::{Receipt, ReceiptError},
    reporting::{SalesReport, Summary},
    sales::{Sale, SaleItem, Stats},
    views::{Screen, render::RenderError},
};
