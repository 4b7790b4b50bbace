//! Catalog
//!
//! Keeps a transient copy of the last fetched product list. The copy is stale as soon as any
//! mutating call is made and is refetched before its next use.

use tracing::{debug, instrument};

use crate::{
    backend::{Backend, BackendError},
    products::{Product, ProductForm, ProductId},
};

/// Client-side view of the product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    stale: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            stale: true,
        }
    }
}

impl Catalog {
    /// Create an empty catalog that will fetch on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cached list must be refetched before use.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Mark the cached list as out of date.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// The last fetched list, whether or not it is stale.
    pub fn cached(&self) -> &[Product] {
        &self.products
    }

    /// Cached product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Fetch the product list unconditionally.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the previous list is kept.
    #[instrument(skip_all)]
    pub async fn refresh<B>(&mut self, backend: &B) -> Result<&[Product], BackendError>
    where
        B: Backend + ?Sized,
    {
        let products = backend.list_products().await?;

        debug!(count = products.len(), "catalog refreshed");

        self.products = products;
        self.stale = false;

        Ok(&self.products)
    }

    /// Product list, refetched first if stale.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the previous list is kept.
    pub async fn products<B>(&mut self, backend: &B) -> Result<&[Product], BackendError>
    where
        B: Backend + ?Sized,
    {
        if self.stale {
            return self.refresh(backend).await;
        }

        Ok(&self.products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip_all, fields(name = %form.name))]
    pub async fn create<B>(&mut self, backend: &B, form: &ProductForm) -> Result<Product, BackendError>
    where
        B: Backend + ?Sized,
    {
        self.stale = true;

        backend.create_product(form).await
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, backend, form))]
    pub async fn update<B>(
        &mut self,
        backend: &B,
        id: ProductId,
        form: &ProductForm,
    ) -> Result<Product, BackendError>
    where
        B: Backend + ?Sized,
    {
        self.stale = true;

        backend.update_product(id, form).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, backend))]
    pub async fn delete<B>(&mut self, backend: &B, id: ProductId) -> Result<(), BackendError>
    where
        B: Backend + ?Sized,
    {
        self.stale = true;

        backend.delete_product(id).await
    }
}
