//! Video call relay server example
//!
//! Run with: cargo run --example relay_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example relay_server                    # binds to 0.0.0.0:8000
//!   cargo run --example relay_server localhost          # binds to 127.0.0.1:8000
//!   cargo run --example relay_server 127.0.0.1:9000     # binds to 127.0.0.1:9000
//!
//! Connect with any WebSocket client and exchange JSON events:
//!
//!   -> {"event":"join_room","room":"meeting1"}
//!   -> {"event":"send_video","image":"<base64>"}
//!   <- {"event":"receive_video","image":"<base64>"}   (other members only)
//!
//! ## Features
//!
//! - Rooms: frames fan out to every other member of the sender's room
//! - Backpressure: each connection has a bounded outbound queue; when a
//!   slow receiver falls behind, its oldest queued frames are evicted
//! - Heartbeat: silent connections are disconnected and cleaned up
//! - Health endpoint: plain HTTP 200 on the port above the bind port

use std::net::SocketAddr;

use relay_rs::{RegistryConfig, RelayServer, ServerConfig};

fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8000;

    // Replace "localhost" with "127.0.0.1"
    let normalized = arg.replace("localhost", "127.0.0.1");

    // Try parsing as SocketAddr first (includes port)
    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    // Try parsing as IP address without port
    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: relay_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:8000)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  relay_server                     # binds to 0.0.0.0:8000");
    eprintln!("  relay_server localhost           # binds to 127.0.0.1:8000");
    eprintln!("  relay_server 127.0.0.1:9000     # binds to 127.0.0.1:9000");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:8000".parse().unwrap(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relay_rs=debug".parse()?)
                .add_directive("relay_server=debug".parse()?),
        )
        .init();

    let health_addr = SocketAddr::new(bind_addr.ip(), bind_addr.port() + 1);
    let config = ServerConfig::with_addr(bind_addr).health(health_addr);
    let registry_config = RegistryConfig::default().outbound_queue_capacity(64);

    println!("Starting relay server on {}", bind_addr);
    println!("Health endpoint on http://{}/", health_addr);
    println!();
    println!("=== Try it ===");
    println!("websocat ws://localhost:{}/", bind_addr.port());
    println!("  {{\"event\":\"join_room\",\"room\":\"meeting1\"}}");
    println!("  {{\"event\":\"send_video\",\"image\":\"...\"}}");
    println!();

    let server = RelayServer::with_registry_config(config, registry_config);

    // Run with Ctrl+C handling
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    Ok(())
}
