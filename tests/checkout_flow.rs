//! Integration tests for the cart and checkout flow

use jiff::civil::date;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use testresult::TestResult;

use till::{
    app::{App, AppError, Command, ErrorKind, View},
    backend::{BackendError, Credentials, MockBackend},
    cart::{CartError, QuantityDelta},
    checkout::{CheckoutError, CheckoutRequest, CheckoutState, CustomerDetails, PaymentMethod},
    notifications::Level,
    products::{Category, Product, ProductDraft, ProductForm, ProductId},
    sales::{Sale, Stats},
};

fn product(id: u64, name: &str, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId(id),
        name: name.to_string(),
        category: Category::Food,
        price: Decimal::from(price),
        stock,
        image: None,
    }
}

fn catalog() -> Vec<Product> {
    vec![
        product(1, "Veg Thali", 100, 10),
        product(2, "Masala Chai", 50, 10),
        product(3, "Samosa", 15, 3),
        product(4, "Jalebi", 30, 0),
    ]
}

fn stats() -> Stats {
    Stats {
        today: Decimal::ZERO,
        month: Decimal::ZERO,
        revenue: Decimal::ZERO,
        bills: 0,
        low_stock: 1,
    }
}

fn confirmation(invoice: &str) -> Sale {
    Sale {
        invoice_id: invoice.to_string(),
        customer_name: "Priya".to_string(),
        customer_phone: "9876500000".to_string(),
        total: Decimal::new(26_250, 2),
        payment_method: "Card".to_string(),
        date: date(2024, 8, 15).at(11, 45, 0, 0),
        items: vec![],
        subtotal: None,
        tax: None,
    }
}

fn server_error() -> BackendError {
    BackendError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "database unavailable".to_string(),
    }
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Priya".to_string(),
        phone: "9876500000".to_string(),
    }
}

/// Backend that accepts the login and serves the dashboard and catalog.
fn backend() -> MockBackend {
    let mut backend = MockBackend::new();

    backend.expect_login().returning(|_| Ok(()));
    backend.expect_stats().returning(|| Ok(stats()));
    backend.expect_list_sales().returning(|| Ok(vec![]));
    backend.expect_list_products().returning(|| Ok(catalog()));

    backend
}

async fn at_till(backend: MockBackend) -> Result<App<MockBackend>, AppError> {
    let mut app = App::new(backend);

    app.dispatch(Command::Login(Credentials::new("admin", "admin123")))
        .await?;
    app.dispatch(Command::Navigate(View::Pos)).await?;
    app.drain_notifications();

    Ok(app)
}

#[tokio::test]
async fn successful_checkout_clears_cart_and_shows_receipt() -> TestResult {
    let mut backend = backend();
    backend
        .expect_checkout()
        .withf(|order: &CheckoutRequest| {
            order.subtotal == Decimal::from(250)
                && order.tax == Decimal::new(1_250, 2)
                && order.total == Decimal::new(26_250, 2)
                && order.payment_method == PaymentMethod::Card
                && order.items.len() == 2
        })
        .times(1)
        .returning(|_| Ok(confirmation("5e1d")));

    let mut app = at_till(backend).await?;

    app.dispatch(Command::AddToCart(ProductId(1))).await?;
    app.dispatch(Command::AddToCart(ProductId(1))).await?;
    app.dispatch(Command::AddToCart(ProductId(2))).await?;
    app.dispatch(Command::OpenCheckout).await?;
    app.dispatch(Command::SubmitCheckout {
        customer: customer(),
        payment_method: PaymentMethod::Card,
    })
    .await?;

    assert!(app.cart().is_empty());
    assert!(app.cart().totals().is_zero());
    assert!(!app.checkout().is_open());

    let receipt = app.receipt().ok_or("receipt overlay should be open")?;

    assert_eq!(receipt.invoice_id(), "5e1d");
    assert_eq!(receipt.customer(), &customer());
    assert_eq!(receipt.lines().len(), 2);
    assert_eq!(receipt.totals().total, Decimal::new(26_250, 2));

    let notifications = app.drain_notifications();

    assert!(
        notifications
            .iter()
            .any(|n| n.level == Level::Success && n.message == "Order Placed Successfully!"),
        "missing success notification: {notifications:?}"
    );

    app.dispatch(Command::CloseReceipt).await?;

    assert!(app.receipt().is_none());
    assert_eq!(app.checkout().state(), &CheckoutState::Idle);

    Ok(())
}

#[tokio::test]
async fn failed_checkout_keeps_cart_and_modal_then_retries() -> TestResult {
    let mut backend = backend();
    let mut attempts = 0;
    backend.expect_checkout().times(2).returning(move |_| {
        attempts += 1;
        if attempts == 1 {
            Err(server_error())
        } else {
            Ok(confirmation("a1b2"))
        }
    });

    let mut app = at_till(backend).await?;

    app.dispatch(Command::AddToCart(ProductId(1))).await?;
    app.dispatch(Command::AddToCart(ProductId(2))).await?;
    app.dispatch(Command::OpenCheckout).await?;

    let cart_before = app.cart().clone();

    let result = app
        .dispatch(Command::SubmitCheckout {
            customer: customer(),
            payment_method: PaymentMethod::Upi,
        })
        .await;

    assert!(
        matches!(
            result,
            Err(AppError::Checkout(CheckoutError::Submission(_)))
        ),
        "expected submission failure, got {result:?}"
    );
    assert_eq!(app.cart(), &cart_before);
    assert!(app.checkout().is_open());
    assert!(matches!(app.checkout().state(), CheckoutState::Failed(_)));

    let notifications = app.drain_notifications();

    assert_eq!(notifications.len(), 1, "{notifications:?}");
    assert!(
        notifications.iter().all(|n| n.level == Level::Error),
        "{notifications:?}"
    );

    let (details, payment_method) = app
        .checkout()
        .last_details()
        .cloned()
        .ok_or("details should be kept for a retry")?;

    assert_eq!(details, customer());

    app.dispatch(Command::SubmitCheckout {
        customer: details,
        payment_method,
    })
    .await?;

    assert!(app.cart().is_empty());

    Ok(())
}

#[tokio::test]
async fn empty_cart_never_reaches_backend() -> TestResult {
    let mut backend = backend();
    backend.expect_checkout().never();

    let mut app = at_till(backend).await?;

    let open = app.dispatch(Command::OpenCheckout).await;

    assert!(
        open.is_err_and(|error| error.kind() == ErrorKind::Validation),
        "opening checkout on an empty cart should be a validation error"
    );

    let submit = app
        .dispatch(Command::SubmitCheckout {
            customer: customer(),
            payment_method: PaymentMethod::Cash,
        })
        .await;

    assert!(
        submit.is_err_and(|error| error.kind() == ErrorKind::Validation),
        "submitting an empty cart should be a validation error"
    );
    assert_eq!(app.checkout().state(), &CheckoutState::Idle);

    Ok(())
}

#[tokio::test]
async fn cart_respects_stock() -> TestResult {
    let mut app = at_till(backend()).await?;

    for _ in 0..3 {
        app.dispatch(Command::AddToCart(ProductId(3))).await?;
    }

    let result = app.dispatch(Command::AddToCart(ProductId(3))).await;

    assert!(
        matches!(
            result,
            Err(AppError::Cart(CartError::StockExceeded(ProductId(3), 3)))
        ),
        "got {result:?}"
    );

    let result = app
        .dispatch(Command::ChangeQuantity {
            product: ProductId(3),
            delta: QuantityDelta::Increment,
        })
        .await;

    assert!(result.is_err(), "increment past stock should fail");
    assert_eq!(app.cart().line(ProductId(3)).map(|line| line.quantity), Some(3));

    let sold_out = app.dispatch(Command::AddToCart(ProductId(4))).await;

    assert!(
        matches!(sold_out, Err(AppError::Cart(CartError::OutOfStock(_)))),
        "got {sold_out:?}"
    );
    assert!(app.cart().line(ProductId(4)).is_none());

    Ok(())
}

#[tokio::test]
async fn decrement_to_zero_removes_line() -> TestResult {
    let mut app = at_till(backend()).await?;

    app.dispatch(Command::AddToCart(ProductId(2))).await?;
    app.dispatch(Command::ChangeQuantity {
        product: ProductId(2),
        delta: QuantityDelta::Decrement,
    })
    .await?;

    assert!(app.cart().is_empty());

    let result = app
        .dispatch(Command::ChangeQuantity {
            product: ProductId(2),
            delta: QuantityDelta::Decrement,
        })
        .await;

    assert!(
        matches!(result, Err(AppError::Cart(CartError::MissingLine(ProductId(2))))),
        "got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn quantities_stay_within_stock_for_mixed_sequences() -> TestResult {
    let mut app = at_till(backend()).await?;
    let stock = 3;

    let steps = [
        QuantityDelta::Increment,
        QuantityDelta::Increment,
        QuantityDelta::Increment,
        QuantityDelta::Increment,
        QuantityDelta::Decrement,
        QuantityDelta::Increment,
        QuantityDelta::Increment,
        QuantityDelta::Decrement,
        QuantityDelta::Decrement,
        QuantityDelta::Decrement,
        QuantityDelta::Decrement,
    ];

    app.dispatch(Command::AddToCart(ProductId(3))).await?;

    for delta in steps {
        _ = app
            .dispatch(Command::ChangeQuantity {
                product: ProductId(3),
                delta,
            })
            .await;

        let quantity = app
            .cart()
            .line(ProductId(3))
            .map_or(0, |line| line.quantity);

        assert!(quantity <= stock, "quantity {quantity} exceeds stock");

        if quantity == 0 {
            app.dispatch(Command::AddToCart(ProductId(3))).await?;
        }
    }

    Ok(())
}

#[tokio::test]
async fn checkout_refetches_stock_before_next_sale() -> TestResult {
    let mut backend = MockBackend::new();
    let mut fetches = 0;

    backend.expect_login().returning(|_| Ok(()));
    backend.expect_stats().returning(|| Ok(stats()));
    backend.expect_list_sales().returning(|| Ok(vec![]));
    backend.expect_list_products().times(2).returning(move || {
        fetches += 1;
        let stock = if fetches == 1 { 10 } else { 1 };

        Ok(vec![product(1, "Veg Thali", 100, stock)])
    });
    backend
        .expect_checkout()
        .times(1)
        .returning(|_| Ok(confirmation("77aa")));

    let mut app = at_till(backend).await?;

    app.dispatch(Command::AddToCart(ProductId(1))).await?;
    app.dispatch(Command::OpenCheckout).await?;
    app.dispatch(Command::SubmitCheckout {
        customer: customer(),
        payment_method: PaymentMethod::Cash,
    })
    .await?;

    assert_eq!(app.catalog().get(ProductId(1)).map(|p| p.stock), Some(1));

    app.dispatch(Command::AddToCart(ProductId(1))).await?;
    let result = app.dispatch(Command::AddToCart(ProductId(1))).await;

    assert!(
        matches!(result, Err(AppError::Cart(CartError::StockExceeded(_, 1)))),
        "got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn blank_customer_never_reaches_backend() -> TestResult {
    let mut backend = backend();
    backend.expect_checkout().never();

    let mut app = at_till(backend).await?;

    app.dispatch(Command::AddToCart(ProductId(2))).await?;
    app.dispatch(Command::OpenCheckout).await?;

    let result = app
        .dispatch(Command::SubmitCheckout {
            customer: CustomerDetails {
                name: String::new(),
                phone: "9876500000".to_string(),
            },
            payment_method: PaymentMethod::Cash,
        })
        .await;

    assert!(
        matches!(
            result,
            Err(AppError::Checkout(CheckoutError::MissingCustomerField("name")))
        ),
        "got {result:?}"
    );
    assert!(app.checkout().is_open());
    assert_eq!(app.cart().len(), 1);

    Ok(())
}

#[tokio::test]
async fn product_edit_keeps_stock_sold_while_editor_was_open() -> TestResult {
    let mut backend = MockBackend::new();
    let mut fetches = 0;

    backend.expect_login().returning(|_| Ok(()));
    backend.expect_stats().returning(|| Ok(stats()));
    backend.expect_list_sales().returning(|| Ok(vec![]));
    backend.expect_list_products().returning(move || {
        fetches += 1;
        let stock = if fetches == 1 { 10 } else { 7 };

        Ok(vec![product(7, "Paneer Roll", 80, stock)])
    });
    backend
        .expect_checkout()
        .times(1)
        .returning(|_| Ok(confirmation("9f3c")));
    backend
        .expect_update_product()
        .withf(|id: &ProductId, form: &ProductForm| {
            *id == ProductId(7) && form.stock == 7 && form.price == Decimal::from(90)
        })
        .times(1)
        .returning(|_, _| Ok(product(7, "Paneer Roll", 90, 7)));

    let mut app = at_till(backend).await?;

    app.dispatch(Command::OpenProductEditor(Some(ProductId(7))))
        .await?;

    for _ in 0..3 {
        app.dispatch(Command::AddToCart(ProductId(7))).await?;
    }

    app.dispatch(Command::OpenCheckout).await?;
    app.dispatch(Command::SubmitCheckout {
        customer: customer(),
        payment_method: PaymentMethod::Cash,
    })
    .await?;

    assert_eq!(app.catalog().get(ProductId(7)).map(|p| p.stock), Some(7));

    app.dispatch(Command::SaveProduct(ProductDraft {
        price: Some(Decimal::from(90)),
        ..ProductDraft::default()
    }))
    .await?;

    assert!(app.editor().is_none());

    Ok(())
}
