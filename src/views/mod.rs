//! Views
//!
//! View models are plain borrows of the store, built by [`App::screen`]. The [`render`]
//! functions turn them into text and never touch the store.

use crate::{
    app::{App, EditorMode, View},
    backend::Backend,
    cart::CartLine,
    checkout::{CheckoutState, CustomerDetails, PaymentMethod},
    pricing::Totals,
    products::Product,
    receipt::Receipt,
    reporting::Summary,
    sales::Sale,
};

pub mod render;

/// Everything the front end shows at one moment.
#[derive(Debug)]
pub struct Screen<'a> {
    /// Logged-in user, if any
    pub username: Option<&'a str>,

    /// Main view
    pub body: Body<'a>,

    /// Checkout modal, while open
    pub checkout: Option<CheckoutModal<'a>>,

    /// Product editor, while open
    pub editor: Option<EditorModal<'a>>,

    /// Receipt overlay, while open
    pub receipt: Option<&'a Receipt>,
}

/// Main view contents.
#[derive(Debug)]
pub enum Body<'a> {
    /// Login form
    Login,

    /// Statistics and recent sales
    Dashboard(Summary<'a>),

    /// Product grid and cart
    Pos(PosView<'a>),

    /// Product management table
    Inventory(&'a [Product]),

    /// Full sales history, in backend order
    Sales(&'a [Sale]),
}

/// A product as offered on the point-of-sale grid.
#[derive(Debug, Clone, Copy)]
pub struct ProductTile<'a> {
    /// Product
    pub product: &'a Product,

    /// Units already in the cart
    pub in_cart: u32,

    /// Whether another unit can be added
    pub available: bool,
}

/// Point-of-sale grid plus the cart.
#[derive(Debug)]
pub struct PosView<'a> {
    /// Product tiles in catalog order
    pub products: Vec<ProductTile<'a>>,

    /// Cart panel
    pub cart: CartView<'a>,
}

/// Cart panel.
#[derive(Debug, Clone)]
pub struct CartView<'a> {
    /// Lines in insertion order
    pub lines: &'a [CartLine],

    /// Totals at full precision
    pub totals: Totals,
}

/// Checkout modal.
#[derive(Debug)]
pub struct CheckoutModal<'a> {
    /// Flow state
    pub state: &'a CheckoutState,

    /// Amount due, computed from the cart right now
    pub totals: Totals,

    /// Details from the last attempt, for a retry
    pub details: Option<&'a (CustomerDetails, PaymentMethod)>,
}

/// Product editor modal.
#[derive(Debug)]
pub struct EditorModal<'a> {
    /// Create or edit
    pub mode: EditorMode,

    /// Product being edited, as currently cached
    pub current: Option<&'a Product>,
}

impl<B: Backend> App<B> {
    /// View model of the current state.
    pub fn screen(&self) -> Screen<'_> {
        let body = match self.view() {
            View::Login => Body::Login,
            View::Dashboard => Body::Dashboard(self.reports().summary()),
            View::Pos => Body::Pos(self.pos_view()),
            View::Inventory => Body::Inventory(self.catalog().cached()),
            View::Sales => Body::Sales(self.reports().sales()),
        };

        let checkout = self.checkout().is_open().then(|| CheckoutModal {
            state: self.checkout().state(),
            totals: self.cart().totals(),
            details: self.checkout().last_details(),
        });

        let editor = self.editor().map(|editor| EditorModal {
            mode: editor.mode(),
            current: match editor.mode() {
                EditorMode::Create => None,
                EditorMode::Edit(id) => self.catalog().get(id),
            },
        });

        Screen {
            username: self.session().map(|session| session.username.as_str()),
            body,
            checkout,
            editor,
            receipt: self.receipt(),
        }
    }

    fn pos_view(&self) -> PosView<'_> {
        let cart = self.cart();

        let products = self
            .catalog()
            .cached()
            .iter()
            .map(|product| {
                let in_cart = cart.line(product.id).map_or(0, |line| line.quantity);

                ProductTile {
                    product,
                    in_cart,
                    available: in_cart < product.stock,
                }
            })
            .collect();

        PosView {
            products,
            cart: CartView {
                lines: cart.lines(),
                totals: cart.totals(),
            },
        }
    }
}
