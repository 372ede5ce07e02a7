use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

const CHANNEL_CAPACITY: usize = 64;

/// Broadcast channels keyed by request id. Every opened channel must be
/// handed to `release` or `release_when_idle`.
#[derive(Clone)]
pub struct ProgressChannels<T> {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<T>>>>,
    linger: Duration,
}

impl<T: Clone + Send + 'static> ProgressChannels<T> {
    pub fn new(linger: Duration) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            linger,
        }
    }

    pub async fn open(&self, request_id: &str) -> broadcast::Sender<T> {
        let mut guard = self.channels.lock().await;
        if let Some(sender) = guard.get(request_id) {
            return sender.clone();
        }
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        guard.insert(request_id.to_string(), sender.clone());
        sender
    }

    pub fn release(&self, request_id: &str) {
        let channels = self.channels.clone();
        let linger = self.linger;
        let request_id = request_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(linger).await;
            channels.lock().await.remove(&request_id);
        });
    }

    pub fn release_when_idle(&self, request_id: &str) {
        let channels = self.channels.clone();
        let linger = self.linger;
        let request_id = request_id.to_string();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(linger).await;
                let mut guard = channels.lock().await;
                match guard.get(&request_id) {
                    Some(sender) if sender.receiver_count() > 0 => continue,
                    Some(_) => {
                        guard.remove(&request_id);
                        break;
                    }
                    None => break,
                }
            }
        });
    }

    pub async fn len(&self) -> usize {
        self.channels.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.channels.lock().await.is_empty()
    }
}
