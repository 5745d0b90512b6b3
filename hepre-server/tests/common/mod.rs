use std::net::SocketAddr;
use tokio::net::TcpListener;

use hepre_server::config::{Config, StorageBackend, StorageConfig, TrustConfig};

pub struct TestServer {
    pub url: String,
    #[allow(dead_code)]
    pub addr: SocketAddr,
}

impl TestServer {
    /// Server on the smallest preset with in-memory keys
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    pub async fn start_with(allow_proxy_key_derivation: bool) -> Self {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0, // OS assigns port
            parameter_set: "PN11QP54".into(),
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                ..Default::default()
            },
            trust: TrustConfig {
                allow_proxy_key_derivation,
            },
            ..Default::default()
        };

        let state = hepre_server::state::AppState::new(&config).await.unwrap();
        let app = hepre_server::routes::router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            url: format!("http://{addr}"),
            addr,
        }
    }
}
