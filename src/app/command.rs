//! Commands accepted by the store

use crate::{
    backend::Credentials,
    cart::QuantityDelta,
    checkout::{CustomerDetails, PaymentMethod},
    products::{ProductDraft, ProductId},
};

use super::View;

/// A single state change requested by the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a session.
    Login(Credentials),

    /// Close the session; the cart is kept.
    Logout,

    /// Switch view and load its data.
    Navigate(View),

    /// Reload the data of the current view.
    Refresh,

    /// Put one unit of a product in the cart.
    AddToCart(ProductId),

    /// Step a cart line up or down by one.
    ChangeQuantity {
        /// Cart line to change
        product: ProductId,
        /// Direction
        delta: QuantityDelta,
    },

    /// Drop a cart line.
    RemoveFromCart(ProductId),

    /// Show the checkout modal.
    OpenCheckout,

    /// Dismiss the checkout modal.
    CancelCheckout,

    /// Place the order.
    SubmitCheckout {
        /// Customer details
        customer: CustomerDetails,
        /// How the customer paid
        payment_method: PaymentMethod,
    },

    /// Open the product editor, for a new product or an existing one.
    OpenProductEditor(Option<ProductId>),

    /// Save the product editor's form with the given changes.
    SaveProduct(ProductDraft),

    /// Dismiss the product editor.
    CloseProductEditor,

    /// Delete a product; the front end confirms first.
    DeleteProduct(ProductId),

    /// Show the receipt of a past sale.
    ViewReceipt(String),

    /// Dismiss the receipt overlay.
    CloseReceipt,
}

impl Command {
    /// Whether the command needs an open session.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Command::Login(_))
    }
}
