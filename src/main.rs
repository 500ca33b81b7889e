use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use redsys_signer::models::payment::decode_base64_lenient;
use redsys_signer::{
    BatchSigner, GatewayForm, MerchantConfig, NotificationForm, OrderId, PaymentRequest,
    PaymentSignatureService,
};

#[derive(Parser)]
#[command(author, version, about = "Sign Redsys payment requests", long_about = None)]
struct Cli {
    /// TOML merchant config; the REDSYS_* environment is used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign a payment request (or an array of them) and print the gateway form
    Sign {
        /// Use this order number instead of the clock
        #[arg(long)]
        order: Option<String>,

        /// JSON input file, stdin when absent
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Verify a gateway notification and print its parameters
    Verify {
        /// JSON input file, stdin when absent
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Decode a Ds_MerchantParameters value
    Decode { value: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignInput {
    Many(Vec<PaymentRequest>),
    One(PaymentRequest),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { value } => {
            let raw = decode_base64_lenient(&value).context("value is not base64")?;
            let json: serde_json::Value =
                serde_json::from_slice(&raw).context("decoded value is not JSON")?;
            print_json(&json)
        }
        Commands::Sign { order, input } => {
            let service = Arc::new(load_service(cli.config.as_deref())?);
            let raw = read_input(input.as_deref())?;
            let parsed: SignInput =
                serde_json::from_str(&raw).context("input is not a payment request")?;

            match (parsed, order) {
                (SignInput::One(request), Some(order)) => {
                    let order = OrderId::parse(&order).context("invalid --order")?;
                    let signed = service.sign_with_order(&request, order)?;
                    print_json(&service.gateway_form(signed))
                }
                (SignInput::One(request), None) => {
                    let signed = service.sign(&request)?;
                    print_json(&service.gateway_form(signed))
                }
                (SignInput::Many(_), Some(_)) => {
                    bail!("--order cannot be used with a batch of requests")
                }
                (SignInput::Many(requests), None) => {
                    let signer = BatchSigner::new(Arc::clone(&service));
                    info!(requests = requests.len(), workers = signer.workers(), "Signing batch");
                    let forms = signer
                        .sign_all(requests)?
                        .into_iter()
                        .enumerate()
                        .map(|(i, result)| {
                            result
                                .map(|signed| service.gateway_form(signed))
                                .with_context(|| format!("request #{i}"))
                        })
                        .collect::<anyhow::Result<Vec<GatewayForm>>>()?;
                    print_json(&forms)
                }
            }
        }
        Commands::Verify { input } => {
            let service = load_service(cli.config.as_deref())?;
            let raw = read_input(input.as_deref())?;
            let form: NotificationForm =
                serde_json::from_str(&raw).context("input is not a notification form")?;
            let params = service.verify_notification(&form)?;
            info!(
                order = %params.order,
                authorised = params.is_authorised(),
                "Notification verified"
            );
            print_json(&params)
        }
    }
}

fn load_service(config: Option<&Path>) -> anyhow::Result<PaymentSignatureService> {
    let config = match config {
        Some(path) => MerchantConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MerchantConfig::from_env().context("loading REDSYS_* environment")?,
    };
    info!(
        merchant = %config.merchant_code,
        terminal = %config.terminal,
        environment = ?config.environment,
        "Merchant config loaded"
    );
    Ok(PaymentSignatureService::with_clock(config))
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
