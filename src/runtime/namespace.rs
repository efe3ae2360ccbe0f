//! Name-based lookup registry for findable classes.

use std::collections::HashMap;
use std::sync::Arc;

use super::class::{LinkedClass, RegisteredType};

/// The registry a findable class is entered into under its declared name.
/// Hidden classes never appear here.
#[derive(Debug, Default)]
pub struct Namespace {
    classes: HashMap<String, Arc<LinkedClass>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a class up by declared name. This is the lookup path a hidden
    /// class is excluded from.
    pub fn find(&self, name: &str) -> Option<RegisteredType> {
        self.classes
            .get(name)
            .map(|class| RegisteredType::new(Arc::clone(class)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub(crate) fn insert(&mut self, class: Arc<LinkedClass>) {
        self.classes.insert(class.declared_name.clone(), class);
    }
}
