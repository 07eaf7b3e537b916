use tokio::sync::broadcast;

const CAPACITY: usize = 16;

/// "Data changed" broadcast. Carries no payload; subscribers refetch.
#[derive(Clone, Debug)]
pub struct ChangeSignal {
    sender: broadcast::Sender<()>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Self { sender }
    }

    pub fn emit(&self) {
        // no subscribers is fine
        let receivers = self.sender.send(()).unwrap_or(0);
        tracing::debug!("data changed, notified {} subscribers", receivers);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for ChangeSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains pending signals and reports whether any arrived since the last call.
pub fn changed_since_last_check(receiver: &mut broadcast::Receiver<()>) -> bool {
    let mut changed = false;

    loop {
        match receiver.try_recv() {
            Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_)) => changed = true,
            Err(broadcast::error::TryRecvError::Empty) => return changed,
            Err(broadcast::error::TryRecvError::Closed) => return true,
        }
    }
}

#[tokio::test]
async fn subscribers_see_every_emit() {
    let signal = ChangeSignal::new();
    let mut first = signal.subscribe();
    let mut second = signal.subscribe();

    signal.emit();

    assert!(first.recv().await.is_ok());
    assert!(second.recv().await.is_ok());
}

#[test]
fn changed_since_last_check_drains() {
    let signal = ChangeSignal::new();
    let mut receiver = signal.subscribe();

    assert!(!changed_since_last_check(&mut receiver));

    for _ in 0..(CAPACITY * 2) {
        signal.emit();
    }

    assert!(changed_since_last_check(&mut receiver));
    assert!(!changed_since_last_check(&mut receiver));
}
