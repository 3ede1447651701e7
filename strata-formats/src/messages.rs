use crate::{Message, RegistryError};
use indexmap::IndexMap;
use std::fmt;

/// the set of message kinds a receiver understands
///
/// `Messages` is a factory map from type tag to prototype: [`add`] a
/// prototype of every kind you expect to receive, then [`create`]
/// materializes a fresh instance of the kind matching an incoming tag so
/// its payload can be decoded into it. This is the single indirection that
/// lets a subscriber accept an open, caller-configured set of kinds
/// without hard-coding them.
///
/// Tags are unique; registering the same tag twice is rejected so dispatch
/// can never be ambiguous. Lookup is O(1); iteration follows insertion
/// order.
///
/// [`add`]: Messages::add
/// [`create`]: Messages::create
#[derive(Default)]
pub struct Messages {
    formats: IndexMap<String, Box<dyn Message>>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a prototype for its type tag
    ///
    /// fails with [`RegistryError::DuplicateType`] when the tag is already
    /// present, leaving the registry unchanged.
    pub fn add(&mut self, prototype: Box<dyn Message>) -> Result<(), RegistryError> {
        let message_type = prototype.message_type().to_string();
        if self.formats.contains_key(&message_type) {
            return Err(RegistryError::DuplicateType(message_type));
        }
        self.formats.insert(message_type, prototype);
        Ok(())
    }

    pub fn contains(&self, message_type: &str) -> bool {
        self.formats.contains_key(message_type)
    }

    /// number of distinct registered tags
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// a fresh default instance of the kind registered for `message_type`
    pub fn create(&self, message_type: &str) -> Result<Box<dyn Message>, RegistryError> {
        self.formats
            .get(message_type)
            .map(|prototype| prototype.default_instance())
            .ok_or_else(|| RegistryError::UnknownType(message_type.to_string()))
    }

    /// registered tags, in insertion order
    pub fn message_types(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.formats.clear();
    }
}

impl Clone for Messages {
    fn clone(&self) -> Self {
        // prototypes carry no state worth keeping, fresh instances suffice
        let formats = self
            .formats
            .iter()
            .map(|(tag, prototype)| (tag.clone(), prototype.default_instance()))
            .collect();
        Self { formats }
    }
}

impl fmt::Debug for Messages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.formats.keys()).finish()
    }
}
