use std::io::Write;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use till::{
    app::{Command, View},
    backend::{Backend, Credentials},
    cart::QuantityDelta,
    checkout::{CustomerDetails, PaymentMethod},
    config::CredentialsConfig,
    products::ProductId,
};

use super::{CliError, Frontend, products::ProductFields};

const PROMPT: &str = "till> ";

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Log in; omitted values fall back to the configured credentials
    Login {
        /// Operator user name
        username: Option<String>,

        /// Operator password
        password: Option<String>,
    },

    /// Log out; the cart is kept
    Logout,

    /// Switch to a view and load its data
    #[command(alias = "go")]
    View {
        /// View to open
        #[arg(value_enum)]
        view: View,
    },

    /// Reload the current view
    Refresh,

    /// Print the current screen again
    Show,

    /// Add one unit of a product to the cart
    Add {
        /// Product id
        id: ProductId,
    },

    /// Step a cart line up (+) or down (-)
    Qty {
        /// Product id
        id: ProductId,

        /// `+` or `-`
        #[arg(allow_hyphen_values = true)]
        delta: QuantityDelta,
    },

    /// Remove a line from the cart
    Remove {
        /// Product id
        id: ProductId,
    },

    /// Open the checkout modal
    Checkout,

    /// Close the checkout modal
    Cancel,

    /// Place the order; omitted details reuse the last attempt
    Pay {
        /// Customer name
        #[arg(long)]
        customer: Option<String>,

        /// Customer phone number
        #[arg(long)]
        phone: Option<String>,

        /// Payment method
        #[arg(long, value_enum)]
        payment: Option<PaymentMethod>,
    },

    /// Open the editor for a new product
    New,

    /// Open the editor for an existing product
    Edit {
        /// Product id
        id: ProductId,
    },

    /// Save the product editor
    Save(ProductFields),

    /// Close the product editor
    Close,

    /// Delete a product
    Delete {
        /// Product id
        id: ProductId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show the receipt of a past sale
    Receipt {
        /// Invoice number
        invoice: String,
    },

    /// Close the receipt
    Dismiss,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Errors raised while splitting a shell line into words.
#[derive(Debug, Error, PartialEq, Eq)]
enum SplitError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("trailing backslash")]
    TrailingEscape,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

type StdinLines = Lines<BufReader<Stdin>>;

pub(crate) async fn run<B: Backend>(
    frontend: &mut Frontend<B>,
    credentials: &CredentialsConfig,
) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let (Some(username), Some(password)) = (&credentials.username, &credentials.password) {
        let login = Command::Login(Credentials::new(username, password));

        if frontend.dispatch(login).await.is_ok() {
            frontend.render()?;
        }
    }

    loop {
        prompt()?;

        let Some(line) = lines.next_line().await.map_err(|_err| CliError::IO)? else {
            break;
        };

        let words = match split_words(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(error) => {
                report(&error)?;
                continue;
            }
        };

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(error) => {
                error.print().map_err(|_err| CliError::IO)?;
                continue;
            }
        };

        match execute(frontend, command, credentials, &mut lines).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) | Err(CliError::App(_)) => {}
            Err(error) => report(&error)?,
        }
    }

    Ok(())
}

async fn execute<B: Backend>(
    frontend: &mut Frontend<B>,
    command: ShellCommand,
    credentials: &CredentialsConfig,
    lines: &mut StdinLines,
) -> Result<Flow, CliError> {
    let command = match command {
        ShellCommand::Quit => return Ok(Flow::Quit),
        ShellCommand::Show => {
            frontend.render()?;
            return Ok(Flow::Continue);
        }
        ShellCommand::Login { username, password } => {
            let username = username.or_else(|| credentials.username.clone());
            let password = password.or_else(|| credentials.password.clone());

            match (username, password) {
                (Some(username), Some(password)) => {
                    Command::Login(Credentials::new(username, password))
                }
                _ => return Err(CliError::MissingCredentials),
            }
        }
        ShellCommand::Logout => Command::Logout,
        ShellCommand::View { view } => Command::Navigate(view),
        ShellCommand::Refresh => Command::Refresh,
        ShellCommand::Add { id } => Command::AddToCart(id),
        ShellCommand::Qty { id, delta } => Command::ChangeQuantity { product: id, delta },
        ShellCommand::Remove { id } => Command::RemoveFromCart(id),
        ShellCommand::Checkout => Command::OpenCheckout,
        ShellCommand::Cancel => Command::CancelCheckout,
        ShellCommand::Pay {
            customer,
            phone,
            payment,
        } => {
            let previous = frontend.app().checkout().last_details().cloned();
            let (previous_customer, previous_payment) = previous.unwrap_or_default();

            Command::SubmitCheckout {
                customer: CustomerDetails {
                    name: customer.unwrap_or(previous_customer.name),
                    phone: phone.unwrap_or(previous_customer.phone),
                },
                payment_method: payment.unwrap_or(previous_payment),
            }
        }
        ShellCommand::New => Command::OpenProductEditor(None),
        ShellCommand::Edit { id } => Command::OpenProductEditor(Some(id)),
        ShellCommand::Save(fields) => Command::SaveProduct(fields.into_draft().await?),
        ShellCommand::Close => Command::CloseProductEditor,
        ShellCommand::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete product {id}? [y/N] "), lines).await? {
                return Err(CliError::Unconfirmed(id));
            }

            Command::DeleteProduct(id)
        }
        ShellCommand::Receipt { invoice } => Command::ViewReceipt(invoice),
        ShellCommand::Dismiss => Command::CloseReceipt,
    };

    let result = frontend.dispatch(command).await;

    frontend.render()?;

    result.map(|()| Flow::Continue)
}

async fn confirm(question: &str, lines: &mut StdinLines) -> Result<bool, CliError> {
    let mut stdout = std::io::stdout().lock();

    write!(stdout, "{question}").map_err(|_err| CliError::IO)?;
    stdout.flush().map_err(|_err| CliError::IO)?;
    drop(stdout);

    let answer = lines.next_line().await.map_err(|_err| CliError::IO)?;

    Ok(answer.is_some_and(|answer| matches!(answer.trim(), "y" | "Y" | "yes")))
}

fn prompt() -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();

    write!(stdout, "{PROMPT}").map_err(|_err| CliError::IO)?;
    stdout.flush().map_err(|_err| CliError::IO)
}

fn report(error: &dyn std::error::Error) -> Result<(), CliError> {
    writeln!(std::io::stderr().lock(), "error: {error}").map_err(|_err| CliError::IO)
}

/// Split a line into words, honouring single quotes, double quotes and backslash escapes.
fn split_words(line: &str) -> Result<Vec<String>, SplitError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                in_word = true;

                loop {
                    match chars.next() {
                        Some(end) if end == c => break,
                        Some('\\') if c == '"' => {
                            current.push(chars.next().ok_or(SplitError::UnterminatedQuote(c))?);
                        }
                        Some(other) => current.push(other),
                        None => return Err(SplitError::UnterminatedQuote(c)),
                    }
                }
            }
            '\\' => {
                in_word = true;
                current.push(chars.next().ok_or(SplitError::TrailingEscape)?);
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
