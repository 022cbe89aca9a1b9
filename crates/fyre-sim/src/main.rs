//! FyreFyre simulator entry point.
//!
//! Wires together the platform, canvas and router, then plays a scripted
//! walkthrough of the core loop: build a topology, guard a server with a
//! firewall, and watch packets get through or dropped.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()           -- TOML config, defaults on first run
//!  └─ AppState::from_config   -- platform, canvas, router, allocator
//!  └─ scripted walkthrough    -- add nodes, guard the server, curl it
//! ```

use anyhow::{anyhow, Context};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fyre_sim::infrastructure::storage::config::load_config;
use fyre_sim::infrastructure::ui_bridge::{self, AppState, CommandResult};

/// Converts a bridge response into a `Result`, surfacing the command error.
fn expect_success<T: Serialize>(result: CommandResult<T>, what: &str) -> anyhow::Result<T> {
    if result.success {
        result
            .data
            .ok_or_else(|| anyhow!("{what}: command returned no data"))
    } else {
        Err(anyhow!(
            "{what}: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        ))
    }
}

fn main() -> anyhow::Result<()> {
    let config = load_config().unwrap_or_default();

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.simulator.log_level.clone())),
        )
        .init();

    info!("FyreFyre simulator starting");

    let state = AppState::from_config(config);

    // ── Default topology ──────────────────────────────────────────────────────
    let client = expect_success(
        ui_bridge::add_client(&state, "Client 1", 100, 100),
        "add client",
    )?;
    let server = expect_success(
        ui_bridge::add_server(&state, "Server 1", 500, 100),
        "add server",
    )?;
    let firewall = expect_success(
        ui_bridge::add_firewall(&state, "Firewall 1", 300, 300),
        "add firewall",
    )?;

    let client_addr = client.address.context("clients always hold an address")?;
    let server_addr = server.address.context("servers always hold an address")?;
    info!(client = %client_addr, server = %server_addr, "topology created");

    // Offer the full default catalogue on the server.
    let catalogue = expect_success(ui_bridge::get_service_catalogue(&state), "read catalogue")?;
    for entry in &catalogue {
        expect_success(
            ui_bridge::register_service(&state, &server_addr, &entry.name, entry.port),
            "register service",
        )?;
    }
    info!(services = catalogue.len(), "default services registered");

    // ── Walkthrough ───────────────────────────────────────────────────────────

    // Unguarded, any port reaches the server.
    let open = expect_success(
        ui_bridge::curl(&state, &client_addr, &server_addr, 22),
        "curl port 22 (unguarded)",
    )?;
    info!(delivered = open.delivered, "ssh before the firewall");

    // Guard the server: allow only the website port, then drag it inside.
    expect_success(
        ui_bridge::configure_firewall(
            &state,
            &firewall.id,
            r#"{ "allowed_ports": [80], "blocked_ips": [] }"#,
        ),
        "configure firewall",
    )?;
    expect_success(
        ui_bridge::move_node(&state, &server.id, 350, 400),
        "move server inside firewall",
    )?;

    let web = expect_success(
        ui_bridge::curl(&state, &client_addr, &server_addr, 80),
        "curl port 80 (guarded)",
    )?;
    info!(delivered = web.delivered, "http through the firewall");

    let ssh = expect_success(
        ui_bridge::curl(&state, &client_addr, &server_addr, 22),
        "curl port 22 (guarded)",
    )?;
    info!(
        delivered = ssh.delivered,
        reason = ssh.reason.as_deref().unwrap_or("-"),
        "ssh through the firewall"
    );

    // In a full desktop build the canvas shell would take over here and issue
    // these same commands from user gestures.  The scripted walkthrough above
    // doubles as a smoke test for the headless variant.
    info!("FyreFyre simulator stopped");
    Ok(())
}
