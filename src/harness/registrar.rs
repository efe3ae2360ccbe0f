//! Hidden-class registration: a thin proxy over the definition facility.
//!
//! The facility is abstracted behind [`DefinitionFacility`] so the scenario
//! logic can be exercised against a stub; the default facility is the
//! in-crate [`Runtime`].

use crate::runtime::{DefineOptions, DefinitionError, RegisteredType, Runtime};

/// The runtime boundary the harness registers classes through: raw bytes and
/// two semantic flags in, a type handle or a typed diagnostic out.
pub trait DefinitionFacility {
    fn define(
        &mut self,
        bytes: &[u8],
        options: DefineOptions,
    ) -> Result<RegisteredType, DefinitionError>;
}

impl DefinitionFacility for Runtime {
    fn define(
        &mut self,
        bytes: &[u8],
        options: DefineOptions,
    ) -> Result<RegisteredType, DefinitionError> {
        Runtime::define(self, bytes, options)
    }
}

/// Registers classes as hidden nestmates: bound to the defining context's
/// trust domain, excluded from every namespace.
#[derive(Debug)]
pub struct HiddenClassRegistrar<F: DefinitionFacility> {
    facility: F,
}

impl<F: DefinitionFacility> HiddenClassRegistrar<F> {
    pub fn new(facility: F) -> Self {
        Self { facility }
    }

    /// One registration attempt. The bytes are passed to the facility
    /// unmodified.
    pub fn register(&mut self, bytes: &[u8]) -> Result<RegisteredType, DefinitionError> {
        self.facility.define(bytes, DefineOptions::HIDDEN_NESTMATE)
    }
}

impl HiddenClassRegistrar<Runtime> {
    /// A registrar over a fresh runtime.
    pub fn with_runtime() -> Self {
        Self::new(Runtime::new())
    }
}
