//! The class-definition runtime
//!
//! This is the facility the harness drives: it turns raw artifact bytes into
//! live types. A definition passes through the stages
//! `Unverified → Verified → Linked → Ready`; failure is terminal at either
//! verification (malformed bytes) or linking (an unresolved name).
//!
//! Findable classes are entered into the [`Namespace`] under their declared
//! name before linking, so a findable class may reference itself. A *hidden*
//! class is never entered anywhere: its own name stays unresolvable forever,
//! which is precisely the behavior the harness asserts against.
//!
//! ## Modules
//!
//! - `namespace` - the name-based lookup registry for findable classes
//! - `facility` - decode, verify, link; the definition state machine
//! - `class` - linked class data, type handles, instances, values

pub mod class;
pub mod facility;
pub mod namespace;

pub use class::{Instance, InvokeError, RegisteredType, Value};
pub use facility::{DefinitionError, Runtime};
pub use namespace::Namespace;

/// Options for one class definition.
///
/// `nestmate` binds the new type to the defining context's trust domain so
/// it shares that context's access privileges. `hidden` keeps the type out
/// of every namespace: no name-based lookup will ever find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefineOptions {
    pub nestmate: bool,
    pub hidden: bool,
}

impl DefineOptions {
    /// The options the harness always uses: trust-domain bound and
    /// non-discoverable.
    pub const HIDDEN_NESTMATE: DefineOptions = DefineOptions {
        nestmate: true,
        hidden: true,
    };

    /// Ordinary findable definition.
    pub const FINDABLE: DefineOptions = DefineOptions {
        nestmate: false,
        hidden: false,
    };
}

/// Identifier of a trust domain. Types in the same domain share access
/// privileges with each other and with the context that defined them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrustDomain(pub(crate) u64);
