//! Test fixtures: an in-process server bound to an ephemeral port.

#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, time::Duration};

use tokio::{net::TcpListener, sync::oneshot};

use studyhall_server::{
    domain::{Room, RoomId, Timestamp},
    infrastructure::{InMemoryBackend, seed::SeedData},
    ui::serve,
};

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

pub struct TestServer {
    addr: SocketAddr,
    pub backend: InMemoryBackend,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server seeded with the demo data plus a room `r1`
    pub async fn start() -> Self {
        let mut seed = SeedData::demo().expect("Failed to build seed data");
        seed.rooms.push(Room::new(
            RoomId::new("r1").unwrap(),
            "Room One".to_string(),
            "Scratch room for tests".to_string(),
            Timestamp::new(100),
        ));
        let backend = InMemoryBackend::seeded(seed).await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let (tx, rx) = oneshot::channel::<()>();
        let state = backend.app_state();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = serve(listener, state, shutdown).await {
                eprintln!("test server stopped: {e}");
            }
        });

        Self {
            addr,
            backend,
            shutdown: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Poll `check` until it returns true or two seconds pass
pub async fn wait_until<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
