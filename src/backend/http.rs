//! REST client for the point-of-sale backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, Url,
    multipart::{Form, Part},
};
use tracing::{debug, instrument};

use crate::{
    checkout::CheckoutRequest,
    config::BackendConfig,
    products::{Product, ProductForm, ProductId, resolve_image},
    sales::{Sale, Stats},
};

use super::{Backend, BackendError, Credentials};

/// HTTP client for the backend's JSON API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base: Url,
    http: Client,
}

impl HttpBackend {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.api_url).map_err(|source| BackendError::InvalidUrl {
            url: config.api_url.clone(),
            reason: source.to_string(),
        })?;

        let mut builder = Client::builder();

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            base,
            http: builder.build()?,
        })
    }

    /// API base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base.as_str().trim_end_matches('/'))
    }

    fn with_resolved_image(&self, mut product: Product) -> Product {
        product.image = product
            .image
            .as_deref()
            .and_then(|reference| resolve_image(&self.base, reference));

        product
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.endpoint("login"))
            .json(credentials)
            .send()
            .await?;

        ensure_success(response).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let response = self.http.get(self.endpoint("products")).send().await?;
        let products: Vec<Product> = ensure_success(response).await?.json().await?;

        debug!(count = products.len(), "fetched products");

        Ok(products
            .into_iter()
            .map(|product| self.with_resolved_image(product))
            .collect())
    }

    #[instrument(skip_all, fields(name = %form.name))]
    async fn create_product(&self, form: &ProductForm) -> Result<Product, BackendError> {
        let response = self
            .http
            .post(self.endpoint("products"))
            .multipart(product_multipart(form))
            .send()
            .await?;

        let created: Product = ensure_success(response).await?.json().await?;

        Ok(self.with_resolved_image(created))
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    async fn update_product(
        &self,
        product: ProductId,
        form: &ProductForm,
    ) -> Result<Product, BackendError> {
        let response = self
            .http
            .put(self.endpoint(&format!("products/{product}")))
            .multipart(product_multipart(form))
            .send()
            .await?;

        let updated: Product = ensure_success(response).await?.json().await?;

        Ok(self.with_resolved_image(updated))
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, product: ProductId) -> Result<(), BackendError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("products/{product}")))
            .send()
            .await?;

        ensure_success(response).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<Stats, BackendError> {
        let response = self.http.get(self.endpoint("stats")).send().await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn list_sales(&self) -> Result<Vec<Sale>, BackendError> {
        let response = self.http.get(self.endpoint("sales")).send().await?;
        let sales: Vec<Sale> = ensure_success(response).await?.json().await?;

        debug!(count = sales.len(), "fetched sales");

        Ok(sales)
    }

    #[instrument(skip_all, fields(items = order.items.len(), total = %order.total))]
    async fn checkout(&self, order: &CheckoutRequest) -> Result<Sale, BackendError> {
        let response = self
            .http
            .post(self.endpoint("checkout"))
            .json(order)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(BackendError::Status { status, body })
}

fn product_multipart(form: &ProductForm) -> Form {
    let multipart = Form::new()
        .text("name", form.name.clone())
        .text("category", form.category.to_string())
        .text("price", form.price.to_string())
        .text("stock", form.stock.to_string());

    match &form.image {
        Some(image) => multipart.part(
            "image",
            Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
        ),
        None => multipart,
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{config::BackendConfig, products::Category};

    use super::*;

    fn config(api_url: &str) -> BackendConfig {
        BackendConfig {
            api_url: api_url.to_string(),
            timeout_seconds: None,
        }
    }

    #[test]
    fn endpoint_joins_paths_under_base() -> TestResult {
        let backend = HttpBackend::new(&config("http://127.0.0.1:5000/api/"))?;

        assert_eq!(
            backend.endpoint("products/4"),
            "http://127.0.0.1:5000/api/products/4"
        );

        Ok(())
    }

    #[test]
    fn new_rejects_invalid_url() {
        let result = HttpBackend::new(&config("not a url"));

        assert!(
            matches!(result, Err(BackendError::InvalidUrl { .. })),
            "expected InvalidUrl, got {result:?}"
        );
    }

    #[test]
    fn products_get_absolute_images() -> TestResult {
        let backend = HttpBackend::new(&config("http://pos.local:5000/api"))?;
        let product = Product {
            id: ProductId(1),
            name: "Tea".to_string(),
            category: Category::Beverages,
            price: rust_decimal::Decimal::from(20),
            stock: 3,
            image: Some("/static/uploads/tea.png".to_string()),
        };

        let resolved = backend.with_resolved_image(product);

        assert_eq!(
            resolved.image.as_deref(),
            Some("http://pos.local:5000/static/uploads/tea.png")
        );

        Ok(())
    }
}
