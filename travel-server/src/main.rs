use std::net::SocketAddr;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use travel_server::persist::Snapshot;
use travel_server::registry::Registry;
use travel_server::web::{AppState, create_router};

/// Snapshot file used when `REGISTRY_SNAPSHOT` is not set.
const DEFAULT_SNAPSHOT_PATH: &str = "registry.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let snapshot_path = PathBuf::from(
        std::env::var("REGISTRY_SNAPSHOT").unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string()),
    );

    // Start from the last snapshot if one exists
    let registry = if snapshot_path.exists() {
        match Snapshot::load_from_path(&snapshot_path) {
            Ok(snapshot) => {
                let registry = snapshot.restore();
                println!("Loaded snapshot from {}", snapshot_path.display());
                registry
            }
            Err(e) => {
                eprintln!("Failed to load snapshot: {e}. Starting empty.");
                Registry::new()
            }
        }
    } else {
        Registry::new()
    };

    let state = AppState::new(registry);
    let app = create_router(state.clone());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000u16);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Travel registry listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET    /health                      - Health check");
    println!("  POST   /legs                        - Add or redefine a leg");
    println!("  GET    /legs/search                 - Search legs");
    println!("  GET    /itineraries/search          - Enumerate itineraries");
    println!("  POST   /users                       - Register a user");
    println!("  POST   /users/:email/bookings       - Book an itinerary");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to listen for shutdown signal: {e}");
            }
        })
        .await
        .expect("server error");

    // Persist the registry on the way out
    let registry = state.registry.read().await;
    match Snapshot::capture(&registry).save_to_path(&snapshot_path) {
        Ok(()) => println!("Saved snapshot to {}", snapshot_path.display()),
        Err(e) => eprintln!("Failed to save snapshot: {e}"),
    }
}
