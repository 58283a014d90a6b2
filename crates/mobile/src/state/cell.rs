use tokio::sync::watch;

/// Observable value with one writer and any number of readers.
///
/// Writes of an equal value are swallowed, so readers only wake on real
/// changes.
pub struct StateCell<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone + PartialEq> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn set(&self, value: T) {
        self.sender.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone + PartialEq + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
