//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use uri_router::config::{parse_config, RoutingConfig};
use uri_router::dispatch::ControllerRegistry;
use uri_router::{HttpServer, Router, Shutdown};

/// Configuration in the shape of the stock routing file.
pub const FIXTURE: &str = r#"
module = ""
namespace = "app::web"
redirect_last_slash = false
force_slash_on_index = false

[segments]
api = "app::api"

[[host_rules]]
pattern = 'localhost\.localdomain'
module = "local"
namespace = "app::local::web"
template = ["$admin"]
[host_rules.segments]
api = "app::local::api"

[[host_rules]]
pattern = 'cmd\.shell'
namespace = "app::console"

[[routes]]
pattern = 'home(\/)*(\?(.*))*'
segment = 0
controller = "index"

[pages."app::web"]
end-of-user-license-agreement = "Eula"

[redirects.404]
segments = []
force_rewrite = false
host = "dynamic"
status = 301

[prevalidate.mycontroller]
command = 301
segments = 2
validate = ['/^[a-z0-9\-]+$/', '/^[0-9]+$/']

[url]
hosts = { static = "static.example.com", secure = "www.example.com" }
https_variants = ["secure"]

[common_urls]
urlAssets = { segments = ["assets"], variant = "static", trailing = true }
urlHome = {}
urlLogin = { segments = ["login"], variant = "secure", trailing = true }
"#;

pub fn fixture() -> RoutingConfig {
    parse_config(FIXTURE).unwrap()
}

pub fn router(config: RoutingConfig) -> Router {
    Router::from_config(config).unwrap()
}

/// A running server and the handles to drive it.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<RoutingConfig>,
}

/// Start a server on an ephemeral port with the index echo controllers registered.
#[allow(dead_code)]
pub async fn start_server(config: RoutingConfig) -> TestServer {
    let server = HttpServer::new(router(config), ControllerRegistry::with_echo);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (updates, updates_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    TestServer {
        addr,
        shutdown,
        updates,
    }
}

/// Client that never follows redirects.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
