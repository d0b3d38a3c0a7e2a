//! Reply registry: type ID → reply factory.
//!
//! Each reply type is registered with a plain factory closure at startup.
//! There is no global table: the registry is an ordinary value, built
//! once and handed to the connection (usually inside an `Arc`).

use std::collections::HashMap;
use std::fmt;

use netcomm_wire::{Reader, WireError};

use crate::{ProtocolError, ServerReply};

/// Creates an empty reply ready to be decoded.
pub type ReplyFactory<C> =
    Box<dyn Fn() -> Box<dyn ServerReply<C>> + Send + Sync>;

/// Maps frame type IDs to reply factories.
///
/// # Example
///
/// ```rust
/// use netcomm_protocol::{ReplyRegistry, ServerReply};
/// use netcomm_wire::{Reader, WireError};
///
/// #[derive(Debug, Default)]
/// struct Pong;
///
/// impl ServerReply<()> for Pong {
///     fn decode(&mut self, _: &mut Reader<'_>) -> Result<(), WireError> {
///         Ok(())
///     }
///
///     fn execute_update(&mut self, _: &()) -> bool {
///         true
///     }
/// }
///
/// let mut registry = ReplyRegistry::<()>::new();
/// registry.register_default::<Pong>(0x01).unwrap();
/// assert!(registry.register_default::<Pong>(0x01).is_err());
/// assert!(registry.get_reply(0x01).is_some());
/// assert!(registry.get_reply(0x02).is_none());
/// ```
pub struct ReplyRegistry<C> {
    factories: HashMap<u8, ReplyFactory<C>>,
}

impl<C: 'static> ReplyRegistry<C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers `factory` under `id`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::DuplicateReply`] if `id` is already taken.
    /// The existing entry is kept.
    pub fn register<F>(&mut self, id: u8, factory: F) -> Result<(), ProtocolError>
    where
        F: Fn() -> Box<dyn ServerReply<C>> + Send + Sync + 'static,
    {
        if self.factories.contains_key(&id) {
            tracing::error!(id, "duplicate reply id");
            return Err(ProtocolError::DuplicateReply(id));
        }
        self.factories.insert(id, Box::new(factory));
        Ok(())
    }

    /// Registers a reply type that starts out as its `Default` value.
    pub fn register_default<R>(&mut self, id: u8) -> Result<(), ProtocolError>
    where
        R: ServerReply<C> + Default,
    {
        self.register(id, || -> Box<dyn ServerReply<C>> {
            Box::new(R::default())
        })
    }

    /// Returns a fresh, empty reply for `id`, or `None` if unknown.
    pub fn get_reply(&self, id: u8) -> Option<Box<dyn ServerReply<C>>> {
        match self.factories.get(&id) {
            Some(factory) => Some(factory()),
            None => {
                tracing::warn!(id, "illegal reply requested");
                None
            }
        }
    }

    /// Creates the reply for `id` and decodes it from `payload`.
    ///
    /// Returns `None` for an unknown ID. Trailing payload bytes the reply
    /// did not read are logged but not an error.
    pub fn decode(
        &self,
        id: u8,
        payload: &[u8],
    ) -> Option<Result<Box<dyn ServerReply<C>>, WireError>> {
        let mut reply = self.get_reply(id)?;
        let mut reader = Reader::new(payload);
        if let Err(e) = reply.decode(&mut reader) {
            return Some(Err(e));
        }
        if !reader.is_empty() {
            tracing::debug!(
                id,
                unread = reader.remaining(),
                "reply left payload bytes unread"
            );
        }
        Some(Ok(reply))
    }

    /// Returns `true` if a reply is registered under `id`.
    pub fn contains(&self, id: u8) -> bool {
        self.factories.contains_key(&id)
    }

    /// Number of registered reply types.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<C: 'static> Default for ReplyRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ReplyRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("ReplyRegistry").field("ids", &ids).finish()
    }
}
