//! Checkout
//!
//! The checkout flow moves through `Idle -> ModalOpen -> Submitting -> Success | Failed`.
//! Totals are computed from the cart when the order is submitted, not when the modal opens, so
//! late cart edits are reflected. A failed submission keeps the cart, the open modal and the
//! entered customer details so the operator can retry.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    backend::{Backend, BackendError},
    cart::{Cart, CartLine},
    pricing::Totals,
    products::ProductId,
    receipt::Receipt,
    sales::Sale,
};

/// Errors raised by the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The checkout modal is not open.
    #[error("checkout is not open")]
    NotOpen,

    /// A customer detail was left blank.
    #[error("customer {0} is required")]
    MissingCustomerField(&'static str),

    /// A submission is already waiting for the backend.
    #[error("checkout already in progress")]
    InFlight,

    /// The backend did not accept the order.
    #[error("checkout failed: {0}")]
    Submission(#[source] BackendError),
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum PaymentMethod {
    /// Cash
    #[default]
    Cash,
    /// Debit or credit card
    Card,
    /// Unified Payments Interface
    #[serde(rename = "UPI")]
    Upi,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
        })
    }
}

/// Customer details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDetails {
    /// Customer name
    pub name: String,

    /// Customer phone number
    pub phone: String,
}

impl CustomerDetails {
    /// Check that neither field is blank.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingCustomerField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingCustomerField("name"));
        }

        if self.phone.trim().is_empty() {
            return Err(CheckoutError::MissingCustomerField("phone"));
        }

        Ok(())
    }
}

/// One line of an order, as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    /// Product sold
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Units sold
    pub qty: u32,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product,
            name: line.name.clone(),
            price: line.price,
            qty: line.quantity,
        }
    }
}

/// Order payload for the checkout endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Customer name
    pub customer_name: String,

    /// Customer phone number
    pub customer_phone: String,

    /// Amount before tax
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Tax charged
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,

    /// Amount payable
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Snapshot of the cart lines
    pub items: Vec<OrderItem>,
}

/// Where the checkout flow currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    /// No checkout in progress
    #[default]
    Idle,

    /// Collecting customer details
    ModalOpen,

    /// Waiting for the backend
    Submitting,

    /// The order was recorded
    Success(Receipt),

    /// The last submission failed; the modal stays open
    Failed(String),
}

/// An order that has been sent, or is about to be sent, to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    /// Request body
    pub request: CheckoutRequest,

    /// Cart lines at submission time
    pub lines: Vec<CartLine>,

    /// Totals at submission time
    pub totals: Totals,

    /// Customer details
    pub customer: CustomerDetails,

    /// Payment method
    pub payment_method: PaymentMethod,
}

/// Drives a cart through checkout.
#[derive(Debug, Default)]
pub struct Checkout {
    state: CheckoutState,
    details: Option<(CustomerDetails, PaymentMethod)>,
}

impl Checkout {
    /// Create an idle checkout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Whether the checkout modal is showing.
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            CheckoutState::ModalOpen | CheckoutState::Submitting | CheckoutState::Failed(_)
        )
    }

    /// Customer details from the last submission attempt, kept for retries.
    pub fn last_details(&self) -> Option<&(CustomerDetails, PaymentMethod)> {
        self.details.as_ref()
    }

    /// Open the checkout modal.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart is empty; the state stays as it was.
    /// - [`CheckoutError::InFlight`]: a submission is in progress.
    pub fn open(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if self.state == CheckoutState::Submitting {
            return Err(CheckoutError::InFlight);
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if !self.is_open() {
            self.state = CheckoutState::ModalOpen;
        }

        Ok(())
    }

    /// Close the modal, or dismiss a finished checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InFlight`] while a submission is in progress.
    pub fn close(&mut self) -> Result<(), CheckoutError> {
        if self.state == CheckoutState::Submitting {
            return Err(CheckoutError::InFlight);
        }

        self.state = CheckoutState::Idle;

        Ok(())
    }

    /// Validate the cart, snapshot it and move to `Submitting`.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InFlight`]: a submission is already in progress.
    /// - [`CheckoutError::NotOpen`]: the modal is not open.
    /// - [`CheckoutError::EmptyCart`]: the cart is empty.
    pub fn begin(
        &mut self,
        cart: &Cart,
        customer: CustomerDetails,
        payment_method: PaymentMethod,
    ) -> Result<PendingOrder, CheckoutError> {
        match self.state {
            CheckoutState::Submitting => return Err(CheckoutError::InFlight),
            CheckoutState::ModalOpen | CheckoutState::Failed(_) => {}
            CheckoutState::Idle | CheckoutState::Success(_) => return Err(CheckoutError::NotOpen),
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        customer.validate()?;

        let totals = cart.totals();
        let lines = cart.lines().to_vec();

        let request = CheckoutRequest {
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            payment_method,
            items: lines.iter().map(OrderItem::from).collect(),
        };

        self.details = Some((customer.clone(), payment_method));
        self.state = CheckoutState::Submitting;

        Ok(PendingOrder {
            request,
            lines,
            totals,
            customer,
            payment_method,
        })
    }

    /// Apply the backend's answer to a pending order.
    ///
    /// On success the receipt is materialised, the cart cleared and the modal closed. On failure
    /// the cart and the open modal are left as they were.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotOpen`]: no submission was in progress.
    /// - [`CheckoutError::Submission`]: the backend rejected the order.
    pub fn complete(
        &mut self,
        pending: PendingOrder,
        outcome: Result<Sale, BackendError>,
        cart: &mut Cart,
    ) -> Result<&Receipt, CheckoutError> {
        if self.state != CheckoutState::Submitting {
            return Err(CheckoutError::NotOpen);
        }

        match outcome {
            Ok(sale) => {
                info!(invoice = %sale.invoice_id, total = %pending.totals.total, "order placed");

                let receipt = Receipt::from_confirmation(
                    &sale,
                    &pending.customer,
                    pending.payment_method,
                    &pending.lines,
                    pending.totals,
                );

                cart.clear();
                self.details = None;
                self.state = CheckoutState::Success(receipt);

                match &self.state {
                    CheckoutState::Success(receipt) => Ok(receipt),
                    _ => Err(CheckoutError::NotOpen),
                }
            }
            Err(source) => {
                warn!(error = %source, "checkout failed");

                self.state = CheckoutState::Failed(source.to_string());

                Err(CheckoutError::Submission(source))
            }
        }
    }

    /// Submit the cart to the backend.
    ///
    /// # Errors
    ///
    /// See [`Checkout::begin`] and [`Checkout::complete`]. An empty cart never reaches the
    /// backend.
    #[instrument(skip_all, fields(lines = cart.len()))]
    pub async fn submit<B>(
        &mut self,
        backend: &B,
        cart: &mut Cart,
        customer: CustomerDetails,
        payment_method: PaymentMethod,
    ) -> Result<&Receipt, CheckoutError>
    where
        B: Backend + ?Sized,
    {
        let pending = self.begin(cart, customer, payment_method)?;
        let outcome = backend.checkout(&pending.request).await;

        self.complete(pending, outcome, cart)
    }
}
