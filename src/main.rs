use clap::Parser;
use serde::Serialize;
use storefront_client::config::cli::{
    load_cart, Command, DiscountCommand, OrderCommand, ShippingCommand, SubtotalArgs,
};
use storefront_client::config::toml_config::LogFormat;
use storefront_client::core::pricing;
use storefront_client::utils::error::ErrorCategory;
use storefront_client::utils::{logger, validation::Validate};
use storefront_client::{
    ApplyDiscountRequest, CliConfig, ClientConfig, ClientError, DiscountApi, OrderApi,
    ReqwestTransport, Result, ShippingApi,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    };

    match settings.log_format {
        LogFormat::Json => logger::init_json_logger(settings.verbose),
        LogFormat::Compact => logger::init_cli_logger(settings.verbose),
    }
    tracing::debug!("Client config: {:?}", settings.client);

    if let Err(e) = settings.client.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(2);
    }

    if let Err(e) = run(cli.command, &settings.client).await {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.category() {
            ErrorCategory::Rejection | ErrorCategory::NotFound => 1,
            ErrorCategory::Configuration | ErrorCategory::Data => 2,
            ErrorCategory::Transport => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(command: Command, config: &ClientConfig) -> Result<()> {
    match command {
        Command::Subtotal(args) => subtotal(args),
        Command::Discounts(command) => {
            run_discounts(command, DiscountApi::new(ReqwestTransport::new(config)?)).await
        }
        Command::Shipping(ShippingCommand::Estimate { address, carrier }) => {
            let estimate = ShippingApi::new(ReqwestTransport::new(config)?)
                .estimate_shipping(&address, &carrier)
                .await?;
            print_json(&estimate)
        }
        Command::Orders(command) => {
            run_orders(command, OrderApi::new(ReqwestTransport::new(config)?)).await
        }
    }
}

fn subtotal(args: SubtotalArgs) -> Result<()> {
    let items = load_cart(&args.cart.cart)?;
    let selected = args.cart.selection(&items);

    let lines: Vec<_> = items
        .iter()
        .filter(|item| selected.contains(item.id))
        .map(|item| {
            let (unit_price, source) = pricing::resolve_price(item);
            serde_json::json!({
                "id": item.id,
                "unitPrice": unit_price,
                "priceSource": source,
                "quantity": item.quantity,
                "lineTotal": pricing::line_total(item),
            })
        })
        .collect();
    let subtotal = pricing::compute_subtotal(&items, &selected);

    let mut summary = serde_json::json!({
        "items": lines,
        "subtotal": subtotal,
    });
    if args.discount_amount.is_some() || args.shipping_fee.is_some() {
        summary["total"] = serde_json::json!(pricing::checkout_total(
            subtotal,
            args.discount_amount.unwrap_or_default(),
            args.shipping_fee.unwrap_or_default(),
        ));
    }
    print_json(&summary)
}

async fn run_discounts(command: DiscountCommand, api: DiscountApi<ReqwestTransport>) -> Result<()> {
    match command {
        DiscountCommand::List => print_json(&api.list_discounts().await?),
        DiscountCommand::Active { min_percentage } => {
            print_json(&api.list_active_discounts(min_percentage).await?)
        }
        DiscountCommand::Get { code } => match api.get_discount_by_code(&code).await? {
            Some(discount) => print_json(&discount),
            None => {
                println!("No discount with code {}", code);
                Ok(())
            }
        },
        DiscountCommand::Create(args) => print_json(&api.create_discount(&args.into()).await?),
        DiscountCommand::Update { code, patch } => {
            let current = api
                .get_discount_by_code(&code)
                .await?
                .ok_or_else(|| ClientError::NotFound {
                    resource: "discount".to_string(),
                    message: format!("No discount with code {}", code),
                })?;
            print_json(&api.update_discount(&current, &patch.into()).await?)
        }
        DiscountCommand::Delete { id } => {
            println!("{}", api.delete_discount(id).await?);
            Ok(())
        }
        DiscountCommand::Spin => match api.spin_discount().await? {
            Some(discount) => print_json(&discount),
            None => {
                println!("No discount available right now");
                Ok(())
            }
        },
        DiscountCommand::Apply { code, cart } => {
            let items = load_cart(&cart.cart)?;
            let selected = cart.selection(&items);
            let request = ApplyDiscountRequest::from_selection(code, &items, &selected);
            match api.apply_discount(&request).await {
                Ok(result) => print_json(&result),
                Err(e) => {
                    if let Some(reason) = e.rejection_reason() {
                        tracing::info!("Rejection reason: {:?}", reason);
                    }
                    Err(e)
                }
            }
        }
    }
}

async fn run_orders(command: OrderCommand, api: OrderApi<ReqwestTransport>) -> Result<()> {
    match command {
        OrderCommand::List => print_json(&api.list_orders().await?),
        OrderCommand::Get { id } => print_json(&api.get_order(id).await?),
        OrderCommand::Status { id, status } => {
            print_json(&api.update_order_status(id, status).await?)
        }
        OrderCommand::Cancel { id } => print_json(&api.cancel_order(id).await?),
        OrderCommand::Delete { id } => {
            println!("{}", api.delete_order(id).await?);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
