//! Caller-owned reuse pool of clients.
//!
//! Checked-out clients return to the pool when the guard drops, so every
//! checkout is returned exactly once, including on error paths. Pooled
//! clients carry only the template's bound options; request state never
//! survives a call.

use std::ops::Deref;
use std::sync::{Mutex, PoisonError};

use crate::client::Client;

#[derive(Debug)]
pub struct ClientPool {
    template: Client,
    idle: Mutex<Vec<Client>>,
}

impl ClientPool {
    pub fn new(template: Client) -> Self {
        Self {
            template,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Takes an idle client, or clones the template when none is idle.
    pub fn checkout(&self) -> PooledClient<'_> {
        let client = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_else(|| self.template.clone());
        PooledClient {
            pool: self,
            client: Some(client),
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn put_back(&self, client: Client) {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).push(client);
    }
}

impl Default for ClientPool {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

/// A client on loan from a `ClientPool`.
#[derive(Debug)]
pub struct PooledClient<'a> {
    pool: &'a ClientPool,
    client: Option<Client>,
}

impl Deref for PooledClient<'_> {
    type Target = Client;

    fn deref(&self) -> &Client {
        // Only `drop` takes the client out.
        self.client.as_ref().unwrap_or(&self.pool.template)
    }
}

impl Drop for PooledClient<'_> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.put_back(client);
        }
    }
}
