use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use coupon_lifecycle::{
    request::CouponRequest,
    service::CouponService,
    settings::Settings,
    store::SledCouponStore,
    telemetry::{create_subscriber, set_subscriber},
    types::CouponId,
};

/// Manage discount coupons stored in a local sled database
#[derive(Debug, Parser)]
#[command(name = "coupon", version)]
struct Cli {
    /// Settings file, defaults to `coupon.toml` in the working directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new coupon
    Create(CouponArgs),
    /// Show a coupon
    Get { id: CouponId },
    /// Change description and discount, or rebuild the coupon under a new code
    Update {
        id: CouponId,
        #[command(flatten)]
        fields: CouponArgs,
    },
    /// Soft delete a coupon
    Delete { id: CouponId },
    /// Redeem a published coupon
    Redeem { id: CouponId },
    /// Publish an unpublished coupon
    Publish { id: CouponId },
    /// Deactivate a published coupon
    Deactivate { id: CouponId },
}

#[derive(Debug, Args)]
struct CouponArgs {
    /// Six alphanumeric characters once symbols are stripped
    #[arg(long)]
    code: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Between 0.50 and 100.00
    #[arg(long)]
    discount: Option<Decimal>,

    /// RFC 3339, e.g. 2026-12-31T23:59:59Z
    #[arg(long)]
    expires: Option<DateTime<Utc>>,

    #[arg(long)]
    published: bool,
}

impl From<CouponArgs> for CouponRequest {
    fn from(args: CouponArgs) -> Self {
        let mut request = CouponRequest::new().set_published(args.published);
        if let Some(code) = &args.code {
            request = request.set_code(code);
        }
        if let Some(description) = &args.description {
            request = request.set_description(description);
        }
        if let Some(discount) = args.discount {
            request = request.set_discount_value(discount);
        }
        if let Some(expires) = args.expires {
            request = request.set_expiration_date(expires);
        }
        request
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let subscriber = create_subscriber(settings.log.filter.clone(), std::io::stderr);
    set_subscriber(subscriber)?;

    let db = settings
        .database
        .open()
        .with_context(|| format!("Failed to open {}", settings.database.path.display()))?;
    let service = CouponService::new(SledCouponStore::new(Arc::new(db))?);

    let coupon = match cli.command {
        Command::Create(args) => service.create(&args.into())?,
        Command::Get { id } => service.find_by_id(&id)?,
        Command::Update { id, fields } => service.update(&id, &fields.into())?,
        Command::Delete { id } => service.delete(&id)?,
        Command::Redeem { id } => service.redeem(&id)?,
        Command::Publish { id } => service.publish(&id)?,
        Command::Deactivate { id } => service.deactivate(&id)?,
    };
    service.store().flush()?;

    println!("{}", serde_json::to_string_pretty(&coupon)?);
    Ok(())
}
