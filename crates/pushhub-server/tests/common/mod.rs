#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pushhub_core::{PushPayload, Subscription};
use pushhub_notifications::{DeliveryError, DeliveryResult, PushDelivery};
use pushhub_server::{AppConfig, AppState, build_app};
use tokio::task::JoinHandle;

/// Delivery double: answers per endpoint, 201 for anything unscripted.
#[derive(Default)]
pub struct ScriptedDelivery {
    answers: Mutex<HashMap<String, Result<DeliveryResult, String>>>,
    sent: Mutex<Vec<(String, PushPayload)>>,
}

impl ScriptedDelivery {
    pub fn answer(&self, endpoint: &str, result: DeliveryResult) {
        self.answers
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Ok(result));
    }

    pub fn fail(&self, endpoint: &str, error: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Err(error.to_string()));
    }

    pub fn sent(&self) -> Vec<(String, PushPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDelivery for ScriptedDelivery {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<DeliveryResult, DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.clone()));
        let answer = self
            .answers
            .lock()
            .unwrap()
            .get(&subscription.endpoint)
            .cloned();
        match answer {
            None => Ok(DeliveryResult::success(201)),
            Some(Ok(result)) => Ok(result),
            Some(Err(msg)) => Err(DeliveryError::Client(msg)),
        }
    }
}

pub struct TestServer {
    pub base: String,
    pub delivery: Arc<ScriptedDelivery>,
    shutdown: tokio::sync::oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

pub async fn start_server() -> TestServer {
    let delivery = Arc::new(ScriptedDelivery::default());
    let state = AppState::new(pushhub_db_memory::create_memory_store(), delivery.clone())
        .with_vapid_public_key("BPublicKeyForTests");
    let app = build_app(state, &AppConfig::default());

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        base: format!("http://{addr}"),
        delivery,
        shutdown: tx,
        handle,
    }
}
