//! # Receipt Bridge CLI
//!
//! Runs the HTTP bridge, or drives the same print pipeline from the shell.
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP API on port 3100
//! receipt-bridge
//!
//! # Same, with USB IDs preconfigured
//! USB_VENDOR_ID=0x04b8 USB_PRODUCT_ID=0x0202 receipt-bridge serve --port 8080
//!
//! # List device nodes and USB devices
//! receipt-bridge scan
//!
//! # USB accessibility report
//! receipt-bridge diagnose
//!
//! # Print once through the fallback chain
//! receipt-bridge print "Hello"
//!
//! # Self-test page
//! receipt-bridge test
//! ```

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;

use receipt_bridge::{
    BridgeError,
    discovery::{DeviceEnumerator, SystemEnumerator, recommendations},
    logging,
    printer::{Backends, PrintService, PrinterState},
    server::{self, ServerConfig},
    transport::{HelperProcess, LpSpooler, SystemLinks},
};

/// Receipt Bridge - local HTTP bridge for thermal receipt printers
#[derive(Parser, Debug)]
#[command(name = "receipt-bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    listen: ListenArgs,

    #[command(flatten)]
    printer: PrinterArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct ListenArgs {
    /// Port to listen on
    #[arg(long, global = true, env = "PORT", default_value = "3100")]
    port: u16,

    /// Address to bind
    #[arg(long, global = true, default_value = "0.0.0.0")]
    host: String,
}

#[derive(Args, Debug)]
struct PrinterArgs {
    /// USB vendor ID of the printer (hex like 0x04b8, or decimal)
    #[arg(long, global = true, env = "USB_VENDOR_ID")]
    usb_vendor_id: Option<String>,

    /// USB product ID of the printer
    #[arg(long, global = true, env = "USB_PRODUCT_ID")]
    usb_product_id: Option<String>,

    /// Address of the network printer used as last resort
    #[arg(
        long,
        global = true,
        env = "PRINTER_TCP_FALLBACK",
        default_value = "tcp://localhost:9100"
    )]
    tcp_fallback: String,

    /// Command that prints by USB IDs (reads JSON on stdin)
    #[arg(
        long,
        global = true,
        env = "USB_HELPER",
        default_value = "python3 print_usb.py"
    )]
    usb_helper: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// List candidate device nodes and USB devices
    Scan,

    /// Print the USB accessibility report
    Diagnose,

    /// Print text through the fallback chain
    Print {
        /// Text to print
        text: String,

        /// Spooler queue to prefer
        #[arg(long)]
        printer_name: Option<String>,
    },

    /// Send the self-test page
    Test,
}

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init(logging::DEFAULT_FILTER) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_service(args: PrinterArgs) -> Result<PrintService, BridgeError> {
    let state = PrinterState::new(Arc::new(SystemLinks), args.tcp_fallback)
        .with_usb_ids(args.usb_vendor_id, args.usb_product_id);

    let backends = Backends {
        enumerator: Arc::new(SystemEnumerator::default()),
        spooler: Arc::new(LpSpooler),
        usb_helper: Arc::new(HelperProcess::from_command_line(&args.usb_helper)?),
    };

    Ok(PrintService::new(Arc::new(state), backends))
}

async fn run() -> Result<(), BridgeError> {
    let cli = Cli::parse();
    let service = build_service(cli.printer)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = ServerConfig {
                listen_addr: format!("{}:{}", cli.listen.host, cli.listen.port),
            };
            server::serve(config, service).await
        }

        Commands::Scan => {
            let enumerator = &service.backends().enumerator;
            let candidates = enumerator.serial_candidates().await;
            let usb = enumerator.usb_devices().await;

            println!("Device nodes ({}):", candidates.len());
            for path in &candidates {
                println!("  {}", path);
            }
            println!("\nUSB devices ({}):", usb.len());
            for device in &usb {
                println!(
                    "  {}:{}  {}  [{}]",
                    device.vendor_id, device.product_id, device.name, device.model
                );
            }
            Ok(())
        }

        Commands::Diagnose => {
            let report = service.diagnostics().await;
            let output = json!({
                "diagnostics": report,
                "recommendations": recommendations(&report),
            });
            let pretty = serde_json::to_string_pretty(&output)
                .map_err(|e| BridgeError::Internal(e.to_string()))?;
            println!("{}", pretty);
            Ok(())
        }

        Commands::Print { text, printer_name } => {
            let message = service.print_plain(&text, printer_name).await?;
            println!("{}", message);
            Ok(())
        }

        Commands::Test => {
            let message = service.print_test().await?;
            println!("{}", message);
            Ok(())
        }
    }
}
