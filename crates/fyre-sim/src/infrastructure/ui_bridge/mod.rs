//! UI command bridge: exposes application-layer operations to the desktop shell.
//!
//! Every command the canvas UI can issue lives here as a plain function that
//! takes the shared [`AppState`] plus string-shaped arguments, and delegates
//! to the application layer.  The shell is the only consumer of this module;
//! it must NOT be imported by the Application or Domain layers.
//!
//! # How commands work (for beginners)
//!
//! The desktop shell invokes a named command with JSON-friendly arguments
//! (strings, numbers) and receives a JSON-friendly response.  Dragging a
//! server onto the canvas becomes `add_server(state, "Server 1", 500, 100)`;
//! clicking "send" in the curl dialog becomes
//! `curl(state, "10.0.0.9", "10.0.0.1", 80)`.
//!
//! # Why DTOs instead of domain types?
//!
//! `Server` borrows its services, `Uuid` and `Address` have their own text
//! forms, and enum states do not serialise the way a UI wants to read them.
//! Every response is therefore flattened into a plain struct of
//! `String`/number fields (`NodeDto`, `DeliveryDto`) deriving
//! `Serialize`/`Deserialize`; ids and addresses cross the bridge as strings
//! in both directions.
//!
//! # `CommandResult<T>` wrapper
//!
//! Commands never return `Result`: the shell gets a
//! `{ success, data, error }` envelope for every call, success or not, so
//! its dispatch code reads `result.success` instead of wrapping each call
//! in a try/catch.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use fyre_core::{
    Address, AddressAllocator, Client, Firewall, NodeId, NodeKind, PolicyDocument, Rect, Server,
    Service,
};

use crate::application::{
    deliver_packet::{Delivery, PacketRouter},
    platform::{BoundsProvider, Platform},
};
use crate::infrastructure::{
    canvas::CanvasStore,
    console::ConsoleSink,
    storage::config::{load_config, AppConfig},
};

/// Default footprint of a client or server on the canvas, in pixels.
const ENDPOINT_WIDTH: u32 = 120;
const ENDPOINT_HEIGHT: u32 = 60;

/// Default footprint of a firewall zone on the canvas, in pixels.
const FIREWALL_SIDE: u32 = 250;

/// First port of the IANA dynamic range, used for simulated source ports.
pub const EPHEMERAL_PORT_START: u16 = 49152;

// ── Shared application state ──────────────────────────────────────────────────

/// Application state shared between UI commands.
///
/// This struct is wrapped in `Arc<>` and handed to every command handler
/// function as its first parameter.
///
/// # Why one coarse `std::sync::Mutex`?
///
/// The whole simulation lives behind a single mutex on `platform`.  Every
/// command is a short critical section over in-memory data, so there is
/// nothing to win by locking finer, and a single lock means a command sees
/// either all of a topology change or none of it.  There is no async runtime
/// here – commands are synchronous functions – so the std mutex is the right
/// tool.
pub struct AppState {
    /// All registered nodes and their firewall policies.
    pub platform: Mutex<Platform>,
    /// Delivers packets to their destination sink.
    pub router: PacketRouter,
    /// Node rectangles on the canvas; shared with `platform` for containment.
    pub canvas: Arc<CanvasStore>,
    /// Allocates simulated addresses for new endpoints.
    pub allocator: Mutex<AddressAllocator>,
    /// The current application configuration (canvas size, service catalogue).
    pub config: Mutex<AppConfig>,
    /// Monotonic counter behind [`AppState::next_ephemeral_port`].
    pub ephemeral_counter: AtomicU16,
}

impl AppState {
    /// Builds the state a desktop shell would boot with: the persisted
    /// configuration, or defaults when none has been saved yet.
    pub fn new() -> Arc<Self> {
        Self::from_config(load_config().unwrap_or_default())
    }

    /// Builds application state from an in-memory configuration.
    ///
    /// Used by `main` after it has initialised logging from the same config,
    /// and by tests that must never touch the real config file on disk.
    pub fn from_config(config: AppConfig) -> Arc<Self> {
        let canvas = Arc::new(CanvasStore::new());
        let platform = Platform::new(Arc::clone(&canvas) as Arc<dyn BoundsProvider>);

        Arc::new(Self {
            platform: Mutex::new(platform),
            router: PacketRouter::new(Arc::new(ConsoleSink)),
            canvas,
            allocator: Mutex::new(AddressAllocator::new()),
            config: Mutex::new(config),
            ephemeral_counter: AtomicU16::new(0),
        })
    }

    /// Returns the next simulated source port from the IANA dynamic range.
    pub fn next_ephemeral_port(&self) -> u16 {
        // 49152..=65535, wrapping within the range.
        let n = self.ephemeral_counter.fetch_add(1, Ordering::Relaxed);
        EPHEMERAL_PORT_START + n % (u16::MAX - EPHEMERAL_PORT_START + 1)
    }
}

// ── Data transfer objects ─────────────────────────────────────────────────────

/// DTO representing one node on the canvas returned to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub name: String,
    pub kind: String,
    /// Dotted simulated address; `None` for firewalls.
    pub address: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Services offered by a server; empty for clients and firewalls.
    pub services: Vec<ServiceDto>,
}

/// DTO for a single service row in the server inspector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDto {
    pub name: String,
    pub port: u16,
    pub state: String,
}

impl From<&Service> for ServiceDto {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name().to_string(),
            port: service.port(),
            state: format!("{:?}", service.state()),
        }
    }
}

/// DTO describing the terminal outcome of one send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryDto {
    pub delivered: bool,
    /// Node id of the receiving endpoint when `delivered`.
    pub destination: Option<String>,
    /// `"client"` or `"server"` when `delivered`.
    pub kind: Option<String>,
    /// Node id of the deciding firewall when dropped.
    pub dropped_by: Option<String>,
    /// Human-readable drop reason when dropped.
    pub reason: Option<String>,
}

impl From<&Delivery> for DeliveryDto {
    fn from(delivery: &Delivery) -> Self {
        match delivery {
            Delivery::Delivered { destination, kind } => Self {
                delivered: true,
                destination: Some(destination.to_string()),
                kind: Some(kind.to_string()),
                dropped_by: None,
                reason: None,
            },
            Delivery::Dropped { firewall, reason } => Self {
                delivered: false,
                destination: None,
                kind: None,
                dropped_by: Some(firewall.to_string()),
                reason: Some(reason.to_string()),
            },
        }
    }
}

/// DTO for one entry of the default service catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntryDto {
    pub name: String,
    pub port: u16,
}

/// DTO for the configured canvas dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfigDto {
    pub width: u32,
    pub height: u32,
}

/// Unified response wrapper used by UI commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Command helpers ───────────────────────────────────────────────────────────

fn parse_node_id(text: &str) -> Result<NodeId, String> {
    text.parse::<NodeId>()
        .map_err(|e| format!("invalid node id: {e}"))
}

fn parse_address(label: &str, text: &str) -> Result<Address, String> {
    text.parse::<Address>()
        .map_err(|e| format!("invalid {label} address: {e}"))
}

/// Allocates a fresh address no registered node currently holds.
fn allocate_address(state: &AppState, platform: &Platform) -> Address {
    let mut allocator = state.allocator.lock().expect("lock poisoned");
    loop {
        let address = allocator.generate();
        if !platform.is_address_used(&address) {
            return address;
        }
    }
}

fn node_dto(
    canvas: &CanvasStore,
    id: NodeId,
    name: &str,
    kind: NodeKind,
    address: Option<&Address>,
    services: &[Service],
) -> NodeDto {
    // Nodes created through the bridge are always placed; the fallback only
    // matters for hand-built states.
    let rect = canvas.rect_of(id).unwrap_or(Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    });
    NodeDto {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        address: address.map(|a| a.to_string()),
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        services: services.iter().map(ServiceDto::from).collect(),
    }
}

// ── Topology commands ─────────────────────────────────────────────────────────

/// Creates a client at the given canvas position with a fresh address.
pub fn add_client(state: &AppState, name: &str, x: i32, y: i32) -> CommandResult<NodeDto> {
    let mut platform = state.platform.lock().expect("lock poisoned");
    let address = allocate_address(state, &platform);
    let client = Client::new(name, address.clone());
    let id = client.id();

    if let Err(e) = platform.register_client(client) {
        return CommandResult::err(e.to_string());
    }
    state.canvas.place(
        id,
        Rect {
            x,
            y,
            width: ENDPOINT_WIDTH,
            height: ENDPOINT_HEIGHT,
        },
    );

    CommandResult::ok(node_dto(
        &state.canvas,
        id,
        name,
        NodeKind::Client,
        Some(&address),
        &[],
    ))
}

/// Creates a server at the given canvas position with a fresh address.
///
/// The server starts with no services; use [`register_service`] to add them
/// from the catalogue.
pub fn add_server(state: &AppState, name: &str, x: i32, y: i32) -> CommandResult<NodeDto> {
    let mut platform = state.platform.lock().expect("lock poisoned");
    let address = allocate_address(state, &platform);
    let server = Server::new(name, address.clone());
    let id = server.id();

    if let Err(e) = platform.register_server(server) {
        return CommandResult::err(e.to_string());
    }
    state.canvas.place(
        id,
        Rect {
            x,
            y,
            width: ENDPOINT_WIDTH,
            height: ENDPOINT_HEIGHT,
        },
    );

    CommandResult::ok(node_dto(
        &state.canvas,
        id,
        name,
        NodeKind::Server,
        Some(&address),
        &[],
    ))
}

/// Creates a firewall zone at the given canvas position.
///
/// Firewalls have no address and registration always succeeds.
pub fn add_firewall(state: &AppState, name: &str, x: i32, y: i32) -> CommandResult<NodeDto> {
    let mut platform = state.platform.lock().expect("lock poisoned");
    let firewall = Firewall::new(name);
    let id = firewall.id();

    platform.register_firewall(firewall);
    state.canvas.place(
        id,
        Rect {
            x,
            y,
            width: FIREWALL_SIDE,
            height: FIREWALL_SIDE,
        },
    );

    CommandResult::ok(node_dto(
        &state.canvas,
        id,
        name,
        NodeKind::Firewall,
        None,
        &[],
    ))
}

/// Moves a node to a new canvas position, keeping its size.
///
/// Containment is re-evaluated from live rectangles on the next send, so a
/// drag immediately changes which firewall (if any) guards the node.
pub fn move_node(state: &AppState, node_id: &str, x: i32, y: i32) -> CommandResult<()> {
    let id = match parse_node_id(node_id) {
        Ok(id) => id,
        Err(e) => return CommandResult::err(e),
    };

    if state.canvas.move_to(id, x, y) {
        CommandResult::ok(())
    } else {
        CommandResult::err(format!("unknown node: {node_id}"))
    }
}

/// Returns every node on the canvas, clients first, then servers, then
/// firewalls, each kind in registration order.
pub fn list_nodes(state: &AppState) -> CommandResult<Vec<NodeDto>> {
    let platform = state.platform.lock().expect("lock poisoned");
    let mut nodes = Vec::new();

    for client in platform.clients() {
        nodes.push(node_dto(
            &state.canvas,
            client.id(),
            client.name(),
            NodeKind::Client,
            Some(client.address()),
            &[],
        ));
    }
    for server in platform.servers() {
        nodes.push(node_dto(
            &state.canvas,
            server.id(),
            server.name(),
            NodeKind::Server,
            Some(server.address()),
            server.services(),
        ));
    }
    for firewall in platform.firewalls() {
        nodes.push(node_dto(
            &state.canvas,
            firewall.id(),
            firewall.name(),
            NodeKind::Firewall,
            None,
            &[],
        ));
    }

    CommandResult::ok(nodes)
}

// ── Traffic commands ──────────────────────────────────────────────────────────

/// Sends a curl-style request: an ephemeral source port and a
/// `curl <addr>:<port>` payload.
pub fn curl(
    state: &AppState,
    source: &str,
    destination: &str,
    port: u16,
) -> CommandResult<DeliveryDto> {
    let source = match parse_address("source", source) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };
    let destination = match parse_address("destination", destination) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };

    let payload = format!("curl {destination}:{port}");
    let source_port = state.next_ephemeral_port();

    let platform = state.platform.lock().expect("lock poisoned");
    match state.router.send(
        &platform,
        source,
        destination,
        port,
        source_port,
        payload.into_bytes(),
    ) {
        Ok(delivery) => CommandResult::ok(DeliveryDto::from(&delivery)),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Sends one packet with explicit ports and payload.
pub fn send_packet(
    state: &AppState,
    source: &str,
    destination: &str,
    destination_port: u16,
    source_port: u16,
    payload: &str,
) -> CommandResult<DeliveryDto> {
    let source = match parse_address("source", source) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };
    let destination = match parse_address("destination", destination) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };

    let platform = state.platform.lock().expect("lock poisoned");
    match state.router.send(
        &platform,
        source,
        destination,
        destination_port,
        source_port,
        payload.as_bytes().to_vec(),
    ) {
        Ok(delivery) => CommandResult::ok(DeliveryDto::from(&delivery)),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

// ── Firewall commands ─────────────────────────────────────────────────────────

/// Replaces a firewall's rule set with the given JSON document.
///
/// A malformed document is rejected without touching the running policy.
pub fn configure_firewall(
    state: &AppState,
    firewall_id: &str,
    document_json: &str,
) -> CommandResult<()> {
    let id = match parse_node_id(firewall_id) {
        Ok(id) => id,
        Err(e) => return CommandResult::err(e),
    };
    // Parse before looking up the firewall so validation failures leave the
    // running policy untouched.
    let document = match PolicyDocument::from_json_str(document_json) {
        Ok(d) => d,
        Err(e) => return CommandResult::err(e.to_string()),
    };

    let mut platform = state.platform.lock().expect("lock poisoned");
    let firewall = match platform.firewall_mut(id) {
        Some(f) => f,
        None => return CommandResult::err(format!("unknown firewall: {firewall_id}")),
    };
    if let Err(e) = firewall.policy_mut().configure(&document) {
        return CommandResult::err(e.to_string());
    }
    CommandResult::ok(())
}

/// Exports a firewall's active rule set as a JSON document.
pub fn export_firewall(state: &AppState, firewall_id: &str) -> CommandResult<String> {
    let id = match parse_node_id(firewall_id) {
        Ok(id) => id,
        Err(e) => return CommandResult::err(e),
    };

    let platform = state.platform.lock().expect("lock poisoned");
    let firewall = match platform.firewall(id) {
        Some(f) => f,
        None => return CommandResult::err(format!("unknown firewall: {firewall_id}")),
    };
    match firewall.policy().export().to_json_string() {
        Ok(json) => CommandResult::ok(json),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

// ── Service commands ──────────────────────────────────────────────────────────

/// Registers a service on the server holding `server_address`.
///
/// Re-registering an existing name silently keeps the first registration.
pub fn register_service(
    state: &AppState,
    server_address: &str,
    name: &str,
    port: u16,
) -> CommandResult<()> {
    let address = match parse_address("server", server_address) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };

    let mut platform = state.platform.lock().expect("lock poisoned");
    match platform.register_service(&address, name, port) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Starts a service on the server holding `server_address`.  Idempotent.
pub fn start_service(state: &AppState, server_address: &str, name: &str) -> CommandResult<()> {
    let address = match parse_address("server", server_address) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };

    let mut platform = state.platform.lock().expect("lock poisoned");
    match platform.start_service(&address, name) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Stops a service on the server holding `server_address`.  Idempotent.
pub fn stop_service(state: &AppState, server_address: &str, name: &str) -> CommandResult<()> {
    let address = match parse_address("server", server_address) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };

    let mut platform = state.platform.lock().expect("lock poisoned");
    match platform.stop_service(&address, name) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Adds a source address to a service's allow-list.
pub fn allow_service_source(
    state: &AppState,
    server_address: &str,
    name: &str,
    source: &str,
) -> CommandResult<()> {
    let address = match parse_address("server", server_address) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };
    let source = match parse_address("source", source) {
        Ok(a) => a,
        Err(e) => return CommandResult::err(e),
    };

    let mut platform = state.platform.lock().expect("lock poisoned");
    match platform.allow_service_source(&address, name, source) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

// ── Config commands ───────────────────────────────────────────────────────────

/// Returns the default service catalogue offered in the server inspector.
pub fn get_service_catalogue(state: &AppState) -> CommandResult<Vec<ServiceEntryDto>> {
    let config = state.config.lock().expect("lock poisoned");
    let dtos = config
        .default_services
        .iter()
        .map(|entry| ServiceEntryDto {
            name: entry.name.clone(),
            port: entry.port,
        })
        .collect();
    CommandResult::ok(dtos)
}

/// Returns the configured canvas dimensions.
pub fn get_canvas_config(state: &AppState) -> CommandResult<CanvasConfigDto> {
    let config = state.config.lock().expect("lock poisoned");
    CommandResult::ok(CanvasConfigDto {
        width: config.canvas.width,
        height: config.canvas.height,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
