use std::path::PathBuf;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use till::{
    app::{Command, View},
    backend::Backend,
    products::{Category, ImageUpload, ProductDraft, ProductId},
};

use super::{CliError, Frontend};

#[derive(Debug, Args)]
pub(crate) struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductsSubcommand {
    /// List products with stock levels
    List,

    /// Add a product
    Add(AddProductArgs),

    /// Change fields of a product
    Update(UpdateProductArgs),

    /// Delete a product
    Delete {
        /// Product id
        id: ProductId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct AddProductArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Category, e.g. Food or Beverages
    #[arg(long)]
    category: Category,

    /// Unit price
    #[arg(long)]
    price: Decimal,

    /// Units in stock
    #[arg(long)]
    stock: u32,

    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct UpdateProductArgs {
    /// Product id
    id: ProductId,

    #[command(flatten)]
    fields: ProductFields,
}

/// Optional product fields; unset ones keep their current value.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct ProductFields {
    /// Product name
    #[arg(long)]
    pub(crate) name: Option<String>,

    /// Category, e.g. Food or Beverages
    #[arg(long)]
    pub(crate) category: Option<Category>,

    /// Unit price
    #[arg(long)]
    pub(crate) price: Option<Decimal>,

    /// Units in stock
    #[arg(long)]
    pub(crate) stock: Option<u32>,

    /// Image file to upload
    #[arg(long)]
    pub(crate) image: Option<PathBuf>,
}

impl ProductFields {
    /// Read the image, if any, and build a draft.
    pub(crate) async fn into_draft(self) -> Result<ProductDraft, CliError> {
        let image = match self.image {
            Some(path) => Some(
                ImageUpload::read(path.clone())
                    .await
                    .map_err(|source| CliError::Image { path, source })?,
            ),
            None => None,
        };

        Ok(ProductDraft {
            name: self.name,
            category: self.category,
            price: self.price,
            stock: self.stock,
            image,
        })
    }
}

impl From<AddProductArgs> for ProductFields {
    fn from(args: AddProductArgs) -> Self {
        Self {
            name: Some(args.name),
            category: Some(args.category),
            price: Some(args.price),
            stock: Some(args.stock),
            image: args.image,
        }
    }
}

pub(crate) async fn run<B: Backend>(
    frontend: &mut Frontend<B>,
    command: ProductsCommand,
) -> Result<(), CliError> {
    match command.command {
        ProductsSubcommand::List => {}
        ProductsSubcommand::Add(args) => {
            let draft = ProductFields::from(args).into_draft().await?;

            frontend.dispatch(Command::OpenProductEditor(None)).await?;
            frontend.dispatch(Command::SaveProduct(draft)).await?;
        }
        ProductsSubcommand::Update(args) => {
            let draft = args.fields.into_draft().await?;

            frontend
                .dispatch(Command::OpenProductEditor(Some(args.id)))
                .await?;
            frontend.dispatch(Command::SaveProduct(draft)).await?;
        }
        ProductsSubcommand::Delete { id, yes } => {
            if !yes {
                return Err(CliError::Unconfirmed(id));
            }

            frontend.dispatch(Command::DeleteProduct(id)).await?;
        }
    }

    frontend.show(View::Inventory).await
}
