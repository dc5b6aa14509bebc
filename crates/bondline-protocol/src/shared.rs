// crates/bondline-protocol/src/shared.rs
//
// SharedProtocol: a cloneable handle for driving one deployment from many
// tokio tasks. Each `transact` closure runs under the lock, so it is one
// serialized step against the whole protocol.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::protocol::Protocol;

#[derive(Clone)]
pub struct SharedProtocol {
    inner: Arc<Mutex<Protocol>>,
}

impl SharedProtocol {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            inner: Arc::new(Mutex::new(protocol)),
        }
    }

    /// Run `f` with exclusive access to the protocol.
    pub async fn transact<T>(&self, f: impl FnOnce(&mut Protocol) -> T) -> T {
        let mut protocol = self.inner.lock().await;
        f(&mut protocol)
    }

    /// Run a read-only `f` against the current state.
    pub async fn read<T>(&self, f: impl FnOnce(&Protocol) -> T) -> T {
        let protocol = self.inner.lock().await;
        f(&protocol)
    }

    /// Clone the current state out of the handle.
    pub async fn snapshot(&self) -> Protocol {
        self.inner.lock().await.clone()
    }
}
