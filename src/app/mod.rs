//! Application store
//!
//! [`App`] owns every piece of client state: the session, the current view, the cached catalog
//! and reports, the cart with its checkout, the product editor, the receipt overlay and the
//! notification queue. Front ends change it only through [`App::dispatch`] and read it back
//! through [`App::screen`](crate::views).
//!
//! A failed command queues exactly one error notification and leaves the store as it was. Login
//! succeeds once the backend accepts the credentials; a dashboard that then fails to load is
//! reported on its own.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::{
    backend::{Backend, BackendError, Credentials},
    cart::{Cart, CartError, QuantityDelta},
    catalog::Catalog,
    checkout::{Checkout, CheckoutState, CustomerDetails, PaymentMethod},
    notifications::{Notification, Notifications},
    products::{ProductDraft, ProductId},
    receipt::Receipt,
    reporting::SalesReport,
};

pub mod command;
pub mod editor;
pub mod error;

pub use command::Command;
pub use editor::{EditorMode, ProductEditor};
pub use error::{AppError, ErrorKind};

/// Top-level screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    /// Login form
    #[default]
    Login,

    /// Statistics and recent sales
    Dashboard,

    /// Product grid and cart
    Pos,

    /// Product management
    Inventory,

    /// Sales history
    Sales,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Login => "Login",
            View::Dashboard => "Dashboard",
            View::Pos => "Point of Sale",
            View::Inventory => "Inventory",
            View::Sales => "Sales History",
        })
    }
}

/// Logged-in operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Operator user name
    pub username: String,
}

/// Client application state.
#[derive(Debug)]
pub struct App<B> {
    backend: B,
    session: Option<Session>,
    view: View,
    catalog: Catalog,
    cart: Cart,
    checkout: Checkout,
    editor: Option<ProductEditor>,
    reports: SalesReport,
    receipt: Option<Receipt>,
    notifications: Notifications,
}

impl<B: Backend> App<B> {
    /// Create a logged-out store talking to `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: None,
            view: View::Login,
            catalog: Catalog::new(),
            cart: Cart::new(),
            checkout: Checkout::new(),
            editor: None,
            reports: SalesReport::new(),
            receipt: None,
            notifications: Notifications::new(),
        }
    }

    /// Backend client
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current session, if logged in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current view
    pub fn view(&self) -> View {
        self.view
    }

    /// Product catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Checkout flow
    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// Product editor, while open.
    pub fn editor(&self) -> Option<&ProductEditor> {
        self.editor.as_ref()
    }

    /// Statistics and sales history
    pub fn reports(&self) -> &SalesReport {
        &self.reports
    }

    /// Receipt overlay, while open.
    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    /// Queued notifications
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Take every queued notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Apply a command.
    ///
    /// # Errors
    ///
    /// Returns the [`AppError`] that stopped the command. The same error has already been queued
    /// as a notification.
    #[instrument(skip(self), fields(view = ?self.view))]
    pub async fn dispatch(&mut self, command: Command) -> Result<(), AppError> {
        let result = if command.requires_session() && self.session.is_none() {
            Err(AppError::NotLoggedIn)
        } else {
            self.apply(command).await
        };

        if let Err(error) = &result {
            debug!(kind = %error.kind(), "command failed");

            self.notifications.push_error(error.to_string());
        }

        result
    }

    async fn apply(&mut self, command: Command) -> Result<(), AppError> {
        match command {
            Command::Login(credentials) => self.login(credentials).await,
            Command::Logout | Command::Navigate(View::Login) => {
                self.logout();

                Ok(())
            }
            Command::Navigate(view) => self.navigate(view).await,
            Command::Refresh => self.load_view(self.view).await,
            Command::AddToCart(product) => self.add_to_cart(product).await,
            Command::ChangeQuantity { product, delta } => {
                self.change_quantity(product, delta).await
            }
            Command::RemoveFromCart(product) => {
                self.cart.remove(product)?;

                Ok(())
            }
            Command::OpenCheckout => Ok(self.checkout.open(&self.cart)?),
            Command::CancelCheckout => Ok(self.checkout.close()?),
            Command::SubmitCheckout {
                customer,
                payment_method,
            } => self.submit_checkout(customer, payment_method).await,
            Command::OpenProductEditor(product) => self.open_editor(product).await,
            Command::SaveProduct(draft) => self.save_product(draft).await,
            Command::CloseProductEditor => {
                self.editor = None;

                Ok(())
            }
            Command::DeleteProduct(product) => self.delete_product(product).await,
            Command::ViewReceipt(invoice) => self.view_receipt(&invoice).await,
            Command::CloseReceipt => self.close_receipt(),
        }
    }

    async fn login(&mut self, credentials: Credentials) -> Result<(), AppError> {
        self.backend
            .login(&credentials)
            .await
            .map_err(|error| match error {
                BackendError::Status { .. } => AppError::InvalidCredentials,
                other => AppError::Backend(other),
            })?;

        info!(username = %credentials.username, "logged in");

        self.session = Some(Session {
            username: credentials.username,
        });
        self.view = View::Dashboard;
        self.notifications.push_success("Welcome back");

        if let Err(error) = self.load_view(View::Dashboard).await {
            warn!(%error, "dashboard load failed");

            self.notifications.push_error(error.to_string());
        }

        Ok(())
    }

    fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(username = %session.username, "logged out");
        }

        self.view = View::Login;
        self.editor = None;
        self.receipt = None;

        if self.checkout.close().is_err() {
            warn!("logged out while a checkout was in flight");
        }
    }

    async fn navigate(&mut self, view: View) -> Result<(), AppError> {
        self.load_view(view).await?;
        self.view = view;

        Ok(())
    }

    async fn load_view(&mut self, view: View) -> Result<(), AppError> {
        match view {
            View::Login => {}
            View::Dashboard => {
                self.reports.refresh_stats(&self.backend).await?;
                self.reports.refresh_sales(&self.backend).await?;
            }
            View::Pos | View::Inventory => {
                self.catalog.invalidate();
                self.load_products().await?;
            }
            View::Sales => {
                self.reports.refresh_sales(&self.backend).await?;
            }
        }

        Ok(())
    }

    /// Refetch the catalog if it is stale and clamp the cart to the new stock levels.
    async fn load_products(&mut self) -> Result<(), AppError> {
        if !self.catalog.is_stale() {
            return Ok(());
        }

        let products = self.catalog.refresh(&self.backend).await?;
        let changed = self.cart.reconcile(products);

        if changed > 0 {
            self.notifications
                .push_info(format!("{changed} cart line(s) adjusted to current stock"));
        }

        Ok(())
    }

    /// Reload the catalog after a successful mutation; a failure is reported but does not fail
    /// the command.
    async fn reload_products(&mut self) {
        if let Err(error) = self.load_products().await {
            warn!(%error, "catalog reload failed");

            self.notifications.push_error(error.to_string());
        }
    }

    async fn add_to_cart(&mut self, product: ProductId) -> Result<(), AppError> {
        self.load_products().await?;

        let product = self
            .catalog
            .get(product)
            .ok_or(CartError::UnknownProduct(product))?;

        let quantity = self.cart.add_item(product)?;

        debug!(product = %product.id, quantity, "added to cart");

        Ok(())
    }

    async fn change_quantity(
        &mut self,
        product: ProductId,
        delta: QuantityDelta,
    ) -> Result<(), AppError> {
        self.load_products().await?;

        let stock = match (self.catalog.get(product), delta) {
            (Some(current), _) => current.stock,
            (None, QuantityDelta::Decrement) => u32::MAX,
            (None, QuantityDelta::Increment) => {
                return Err(CartError::UnknownProduct(product).into());
            }
        };

        self.cart.change_quantity(product, delta, stock)?;

        Ok(())
    }

    async fn submit_checkout(
        &mut self,
        customer: CustomerDetails,
        payment_method: PaymentMethod,
    ) -> Result<(), AppError> {
        let receipt = self
            .checkout
            .submit(&self.backend, &mut self.cart, customer, payment_method)
            .await?
            .clone();

        self.catalog.invalidate();
        self.receipt = Some(receipt);
        self.notifications.push_success("Order Placed Successfully!");

        if matches!(self.view, View::Pos | View::Inventory) {
            self.reload_products().await;
        }

        Ok(())
    }

    async fn open_editor(&mut self, product: Option<ProductId>) -> Result<(), AppError> {
        let editor = match product {
            None => ProductEditor::create(),
            Some(id) => {
                self.load_products().await?;

                self.catalog.get(id).ok_or(AppError::UnknownProduct(id))?;

                ProductEditor::edit(id)
            }
        };

        self.editor = Some(editor);

        Ok(())
    }

    async fn save_product(&mut self, draft: ProductDraft) -> Result<(), AppError> {
        let editor = self.editor.ok_or(AppError::EditorClosed)?;

        let message = match editor.mode() {
            EditorMode::Create => {
                let form = editor.form(draft, None)?;

                self.catalog.create(&self.backend, &form).await?;

                "Product added!"
            }
            EditorMode::Edit(id) => {
                self.load_products().await?;

                let current = self.catalog.get(id).ok_or(AppError::UnknownProduct(id))?;
                let form = editor.form(draft, Some(current))?;

                self.catalog.update(&self.backend, id, &form).await?;

                "Product updated!"
            }
        };

        self.editor = None;
        self.notifications.push_success(message);
        self.reload_products().await;

        Ok(())
    }

    async fn delete_product(&mut self, product: ProductId) -> Result<(), AppError> {
        self.catalog.delete(&self.backend, product).await?;

        if self
            .editor
            .as_ref()
            .is_some_and(|editor| editor.mode() == EditorMode::Edit(product))
        {
            self.editor = None;
        }

        self.notifications.push_success("Product deleted");
        self.reload_products().await;

        Ok(())
    }

    async fn view_receipt(&mut self, invoice: &str) -> Result<(), AppError> {
        if self.reports.find(invoice).is_none() {
            self.reports.refresh_sales(&self.backend).await?;
        }

        let sale = self
            .reports
            .find(invoice)
            .ok_or_else(|| AppError::UnknownInvoice(invoice.trim_start_matches('#').to_string()))?;

        self.receipt = Some(Receipt::from_sale(sale));

        Ok(())
    }

    fn close_receipt(&mut self) -> Result<(), AppError> {
        self.receipt = None;

        if matches!(self.checkout.state(), CheckoutState::Success(_)) {
            self.checkout.close()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        backend::MockBackend,
        checkout::CheckoutRequest,
        notifications::Level,
        products::{Category, Product, ProductForm},
        sales::Sale,
    };

    use super::*;

    fn product(id: u64, stock: u32) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Item {id}"),
            category: Category::Grocery,
            price: Decimal::from(40),
            stock,
            image: None,
        }
    }

    fn logged_in(backend: MockBackend) -> App<MockBackend> {
        let mut app = App::new(backend);

        app.session = Some(Session {
            username: "admin".to_string(),
        });
        app.view = View::Pos;

        app
    }

    #[tokio::test]
    async fn commands_need_a_session() {
        let mut app = App::new(MockBackend::new());

        let result = app.dispatch(Command::AddToCart(ProductId(1))).await;

        assert!(matches!(result, Err(AppError::NotLoggedIn)), "got {result:?}");
        assert_eq!(app.notifications().len(), 1);
    }

    #[tokio::test]
    async fn rejected_login_is_an_auth_error() {
        let mut backend = MockBackend::new();
        backend.expect_login().times(1).returning(|_| {
            Err(BackendError::Status {
                status: StatusCode::UNAUTHORIZED,
                body: String::new(),
            })
        });

        let mut app = App::new(backend);

        let result = app
            .dispatch(Command::Login(Credentials::new("admin", "wrong")))
            .await;

        assert!(
            result.is_err_and(|error| error.kind() == ErrorKind::Auth),
            "expected auth error"
        );
        assert_eq!(app.view(), View::Login);
        assert!(app.session().is_none());
    }

    #[tokio::test]
    async fn add_to_cart_loads_catalog_once() -> TestResult {
        let mut backend = MockBackend::new();
        backend
            .expect_list_products()
            .times(1)
            .returning(|| Ok(vec![product(1, 2)]));

        let mut app = logged_in(backend);

        app.dispatch(Command::AddToCart(ProductId(1))).await?;
        app.dispatch(Command::AddToCart(ProductId(1))).await?;

        assert_eq!(app.cart().line(ProductId(1)).map(|line| line.quantity), Some(2));
        assert!(app.notifications().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_cannot_be_added() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_products()
            .times(1)
            .returning(|| Ok(vec![product(1, 2)]));

        let mut app = logged_in(backend);

        let result = app.dispatch(Command::AddToCart(ProductId(9))).await;

        assert!(
            matches!(result, Err(AppError::Cart(CartError::UnknownProduct(ProductId(9))))),
            "got {result:?}"
        );
        assert!(app.cart().is_empty());
    }

    #[tokio::test]
    async fn failed_navigation_keeps_current_view() {
        let mut backend = MockBackend::new();
        backend.expect_list_sales().times(1).returning(|| {
            Err(BackendError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: String::new(),
            })
        });

        let mut app = logged_in(backend);

        let result = app.dispatch(Command::Navigate(View::Sales)).await;

        assert!(result.is_err_and(|error| error.kind() == ErrorKind::Network), "expected network error");
        assert_eq!(app.view(), View::Pos);
        assert_eq!(app.notifications().len(), 1);
    }

    #[tokio::test]
    async fn logout_keeps_cart() -> TestResult {
        let mut backend = MockBackend::new();
        backend
            .expect_list_products()
            .times(1)
            .returning(|| Ok(vec![product(1, 2)]));

        let mut app = logged_in(backend);

        app.dispatch(Command::AddToCart(ProductId(1))).await?;
        app.dispatch(Command::Logout).await?;

        assert!(app.session().is_none());
        assert_eq!(app.view(), View::Login);
        assert_eq!(app.cart().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn edit_requires_known_product() -> TestResult {
        let mut backend = MockBackend::new();
        backend
            .expect_list_products()
            .times(1)
            .returning(|| Ok(vec![product(1, 2)]));

        let mut app = logged_in(backend);

        app.dispatch(Command::OpenProductEditor(Some(ProductId(1))))
            .await?;

        assert_eq!(
            app.editor().map(ProductEditor::mode),
            Some(EditorMode::Edit(ProductId(1)))
        );

        let result = app.dispatch(Command::OpenProductEditor(Some(ProductId(5)))).await;

        assert!(matches!(result, Err(AppError::UnknownProduct(ProductId(5)))), "got {result:?}");

        Ok(())
    }

    #[tokio::test]
    async fn login_survives_dashboard_failure() {
        let mut backend = MockBackend::new();
        backend.expect_login().times(1).returning(|_| Ok(()));
        backend.expect_stats().times(1).returning(|| {
            Err(BackendError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: String::new(),
            })
        });
        backend.expect_list_sales().never();

        let mut app = App::new(backend);

        let result = app
            .dispatch(Command::Login(Credentials::new("admin", "admin123")))
            .await;

        assert!(result.is_ok(), "got {result:?}");
        assert_eq!(app.session().map(|s| s.username.as_str()), Some("admin"));
        assert_eq!(app.view(), View::Dashboard);
        assert_eq!(
            app.drain_notifications()
                .into_iter()
                .map(|n| n.level)
                .collect::<Vec<_>>(),
            [Level::Success, Level::Error]
        );
    }

    #[tokio::test]
    async fn save_after_checkout_sends_current_stock() -> TestResult {
        let mut backend = MockBackend::new();
        let mut fetches = 0;

        backend.expect_list_products().times(3).returning(move || {
            fetches += 1;
            let stock = if fetches == 1 { 10 } else { 7 };

            Ok(vec![product(7, stock)])
        });
        backend
            .expect_checkout()
            .withf(|order: &CheckoutRequest| order.items.first().map(|item| item.qty) == Some(3))
            .times(1)
            .returning(|order| {
                Ok(Sale {
                    invoice_id: "c0ffee".to_string(),
                    customer_name: order.customer_name.clone(),
                    customer_phone: order.customer_phone.clone(),
                    total: order.total,
                    payment_method: "Cash".to_string(),
                    date: date(2024, 10, 2).at(9, 30, 0, 0),
                    items: vec![],
                    subtotal: None,
                    tax: None,
                })
            });
        backend
            .expect_update_product()
            .withf(|id: &ProductId, form: &ProductForm| {
                *id == ProductId(7) && form.stock == 7 && form.price == Decimal::from(45)
            })
            .times(1)
            .returning(|_, _| Ok(product(7, 7)));

        let mut app = logged_in(backend);

        app.dispatch(Command::OpenProductEditor(Some(ProductId(7))))
            .await?;

        for _ in 0..3 {
            app.dispatch(Command::AddToCart(ProductId(7))).await?;
        }

        app.dispatch(Command::OpenCheckout).await?;
        app.view = View::Sales;
        app.dispatch(Command::SubmitCheckout {
            customer: CustomerDetails {
                name: "Ravi".to_string(),
                phone: "9000011111".to_string(),
            },
            payment_method: PaymentMethod::Cash,
        })
        .await?;

        assert!(app.catalog().is_stale());

        app.dispatch(Command::SaveProduct(ProductDraft {
            price: Some(Decimal::from(45)),
            ..ProductDraft::default()
        }))
        .await?;

        assert!(app.editor().is_none());

        Ok(())
    }
}
