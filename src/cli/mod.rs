use std::{io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use rusty_money::iso::Currency;
use thiserror::Error;

use till::{
    app::{App, AppError, Command, View},
    backend::{Backend, BackendError, Credentials, HttpBackend},
    config::{Config, CredentialsConfig},
    observability::{self, ObservabilityError},
    products::ProductId,
    views::render::{self, RenderError},
};

mod products;
mod sell;
mod shell;

#[derive(Debug, Parser)]
#[command(name = "till", about = "Point-of-sale dashboard client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show today's figures and the latest sales
    Dashboard,

    /// Manage the product catalog
    Products(products::ProductsCommand),

    /// List every recorded sale
    Sales,

    /// Print the receipt of a past sale
    Receipt {
        /// Invoice number, with or without a leading `#`
        invoice: String,
    },

    /// Ring up a sale and print its receipt
    Sell(sell::SellArgs),

    /// Start an interactive session
    Shell,
}

/// Errors that end the process.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(
        "missing credentials: pass --username and --password or set TILL_USERNAME and TILL_PASSWORD"
    )]
    MissingCredentials,

    #[error("refusing to delete product {0} without confirmation")]
    Unconfirmed(ProductId),

    #[error("could not read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error")]
    IO,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), CliError> {
        observability::init(&self.config.logging)?;

        let backend = HttpBackend::new(&self.config.backend)?;
        let mut frontend = Frontend::new(App::new(backend), self.config.display.currency.currency());

        if let Commands::Shell = self.command {
            return shell::run(&mut frontend, &self.config.credentials).await;
        }

        frontend
            .dispatch(Command::Login(credentials(&self.config.credentials)?))
            .await?;

        match self.command {
            Commands::Dashboard => frontend.show(View::Dashboard).await,
            Commands::Products(command) => products::run(&mut frontend, command).await,
            Commands::Sales => frontend.show(View::Sales).await,
            Commands::Receipt { invoice } => {
                frontend.dispatch(Command::ViewReceipt(invoice)).await?;
                frontend.render_receipt()
            }
            Commands::Sell(args) => sell::run(&mut frontend, args).await,
            Commands::Shell => Ok(()),
        }
    }
}

fn credentials(config: &CredentialsConfig) -> Result<Credentials, CliError> {
    match (&config.username, &config.password) {
        (Some(username), Some(password)) => Ok(Credentials::new(username, password)),
        _ => Err(CliError::MissingCredentials),
    }
}

/// Terminal front end: dispatches commands, prints notifications to stderr and views to stdout.
#[derive(Debug)]
pub(crate) struct Frontend<B> {
    app: App<B>,
    currency: &'static Currency,
}

impl<B: Backend> Frontend<B> {
    fn new(app: App<B>, currency: &'static Currency) -> Self {
        Self { app, currency }
    }

    fn app(&self) -> &App<B> {
        &self.app
    }

    async fn dispatch(&mut self, command: Command) -> Result<(), CliError> {
        let result = self.app.dispatch(command).await;

        self.flush_notifications()?;

        result.map_err(CliError::from)
    }

    async fn show(&mut self, view: View) -> Result<(), CliError> {
        self.dispatch(Command::Navigate(view)).await?;
        self.render()
    }

    fn flush_notifications(&mut self) -> Result<(), CliError> {
        let mut stderr = std::io::stderr().lock();

        for notification in self.app.drain_notifications() {
            writeln!(stderr, "{notification}").map_err(|_err| CliError::IO)?;
        }

        Ok(())
    }

    fn render(&self) -> Result<(), CliError> {
        let mut stdout = std::io::stdout().lock();

        render::screen(&mut stdout, &self.app.screen(), self.currency)?;

        stdout.flush().map_err(|_err| CliError::IO)
    }

    fn render_receipt(&self) -> Result<(), CliError> {
        let Some(receipt) = self.app.receipt() else {
            return Ok(());
        };

        let mut stdout = std::io::stdout().lock();

        receipt
            .write_to(&mut stdout, self.currency)
            .map_err(RenderError::from)?;

        stdout.flush().map_err(|_err| CliError::IO)
    }
}
