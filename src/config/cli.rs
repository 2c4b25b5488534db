use crate::config::toml_config::{LogFormat, TomlConfig};
use crate::config::ClientConfig;
use crate::domain::model::{CartLineItem, DiscountDraft, DiscountPatch, OrderStatus, SelectionSet};
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "storefront")]
#[command(about = "Client for the phone storefront REST backend")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Backend base URL [default: http://localhost:8080/api]")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long = "header", global = true, value_parser = parse_header, help = "Extra request header, NAME=VALUE")]
    pub headers: Vec<(String, String)>,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Subtotal of the selected items in a cart file
    Subtotal(SubtotalArgs),
    #[command(subcommand)]
    Discounts(DiscountCommand),
    #[command(subcommand)]
    Shipping(ShippingCommand),
    #[command(subcommand)]
    Orders(OrderCommand),
}

#[derive(Debug, Clone, Args)]
pub struct CartArgs {
    #[arg(long, help = "JSON file holding an array of cart line items")]
    pub cart: PathBuf,

    #[arg(long, value_delimiter = ',', help = "Comma-separated item ids to include")]
    pub select: Vec<u64>,

    #[arg(long, help = "Include every item in the cart")]
    pub all: bool,
}

impl CartArgs {
    pub fn selection(&self, items: &[CartLineItem]) -> SelectionSet {
        if self.all {
            SelectionSet::all(items)
        } else {
            self.select.iter().copied().collect()
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SubtotalArgs {
    #[command(flatten)]
    pub cart: CartArgs,

    #[arg(long, help = "Discount granted by the backend, subtracted from the total")]
    pub discount_amount: Option<Decimal>,

    #[arg(long, help = "Shipping fee added to the total")]
    pub shipping_fee: Option<Decimal>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DiscountCommand {
    List,
    Active {
        #[arg(long)]
        min_percentage: Option<f64>,
    },
    Get {
        code: String,
    },
    Create(DiscountDraftArgs),
    /// Change fields of the discount with this code; the rest are kept
    Update {
        code: String,
        #[command(flatten)]
        patch: DiscountPatchArgs,
    },
    Delete {
        id: u64,
    },
    /// Draw a random discount
    Spin,
    /// Price the selected cart items with a discount code
    Apply {
        #[arg(long)]
        code: String,
        #[command(flatten)]
        cart: CartArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct DiscountDraftArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub percentage: f64,
    #[arg(long, help = "RFC 3339 timestamp")]
    pub valid_from: DateTime<FixedOffset>,
    #[arg(long, help = "RFC 3339 timestamp")]
    pub valid_to: DateTime<FixedOffset>,
    #[arg(long, default_value = "0")]
    pub min_order_value: Decimal,
    #[arg(long, default_value = "1")]
    pub weight: u32,
}

impl From<DiscountDraftArgs> for DiscountDraft {
    fn from(args: DiscountDraftArgs) -> Self {
        DiscountDraft {
            code: args.code,
            discount_percentage: args.percentage,
            valid_from: args.valid_from,
            valid_to: args.valid_to,
            min_order_value: args.min_order_value,
            probability_weight: args.weight,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DiscountPatchArgs {
    #[arg(long = "code", id = "new_code", value_name = "CODE")]
    pub code: Option<String>,
    #[arg(long)]
    pub percentage: Option<f64>,
    #[arg(long)]
    pub valid_from: Option<DateTime<FixedOffset>>,
    #[arg(long)]
    pub valid_to: Option<DateTime<FixedOffset>>,
    #[arg(long)]
    pub min_order_value: Option<Decimal>,
    #[arg(long)]
    pub weight: Option<u32>,
}

impl From<DiscountPatchArgs> for DiscountPatch {
    fn from(args: DiscountPatchArgs) -> Self {
        DiscountPatch {
            code: args.code,
            discount_percentage: args.percentage,
            valid_from: args.valid_from,
            valid_to: args.valid_to,
            min_order_value: args.min_order_value,
            probability_weight: args.weight,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum ShippingCommand {
    Estimate {
        #[arg(long)]
        address: String,
        #[arg(long)]
        carrier: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum OrderCommand {
    List,
    Get { id: u64 },
    Status { id: u64, status: OrderStatus },
    Cancel { id: u64 },
    Delete { id: u64 },
}

/// Settings after merging the optional TOML file with command-line overrides.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub client: ClientConfig,
    pub log_format: LogFormat,
    pub verbose: bool,
}

impl CliConfig {
    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve(&self) -> Result<ResolvedSettings> {
        let toml = match &self.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };

        let (mut client, mut log_format, mut verbose) = match toml {
            Some(toml) => {
                let log_format = toml.log_format();
                let verbose = toml.verbose();
                (toml.into_client_config(), log_format, verbose)
            }
            None => (ClientConfig::default(), LogFormat::Compact, false),
        };

        if let Some(base_url) = &self.base_url {
            client.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            client.timeout_seconds = Some(timeout);
        }
        for (name, value) in &self.headers {
            client.headers.insert(name.clone(), value.clone());
        }
        if self.json_logs {
            log_format = LogFormat::Json;
        }
        verbose |= self.verbose;

        Ok(ResolvedSettings {
            client,
            log_format,
            verbose,
        })
    }
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub fn load_cart(path: &Path) -> Result<Vec<CartLineItem>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
