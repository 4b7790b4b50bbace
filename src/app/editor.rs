//! Product editor

use crate::products::{Product, ProductDraft, ProductForm, ProductFormError, ProductId};

/// What saving the editor does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Create a new product
    Create,

    /// Replace the fields of an existing product
    Edit(ProductId),
}

/// Add/edit product form state.
///
/// Only the target is kept; edits are applied to the product as currently cached, so a stock
/// change made elsewhere while the editor is open is not overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductEditor {
    mode: EditorMode,
}

impl ProductEditor {
    /// Blank editor for a new product.
    pub fn create() -> Self {
        Self {
            mode: EditorMode::Create,
        }
    }

    /// Editor for an existing product.
    pub fn edit(product: ProductId) -> Self {
        Self {
            mode: EditorMode::Edit(product),
        }
    }

    /// Create or edit
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Complete form for `draft`.
    ///
    /// Edits start from `current`, the freshly loaded product being edited. New products, or an
    /// edit without a matching `current`, need every field.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductFormError`] for missing or invalid fields.
    pub fn form(
        &self,
        draft: ProductDraft,
        current: Option<&Product>,
    ) -> Result<ProductForm, ProductFormError> {
        match (self.mode, current) {
            (EditorMode::Edit(id), Some(product)) if product.id == id => {
                let mut form = ProductForm::from_product(product);

                form.apply(draft)?;

                Ok(form)
            }
            _ => ProductForm::from_draft(draft),
        }
    }
}
