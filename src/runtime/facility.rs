//! Decode, verify, and link: the class-definition state machine.

use std::sync::Arc;

use thiserror::Error;
use veil_format::{ClassImage, MethodBody, TypeRef};

use super::class::{LinkedClass, LinkedMethod, RegisteredType, ResolvedType};
use super::namespace::Namespace;
use super::{DefineOptions, TrustDomain};

/// Terminal failures of one definition attempt.
///
/// `MalformedBytes` is a verification failure; `NameResolution` is a linking
/// failure. The distinction matters to callers: a structural self-reference
/// in a hidden class must surface as `NameResolution`, never as malformed
/// bytes, and its message always names the unresolved type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("malformed class bytes: {0}")]
    MalformedBytes(String),
    #[error("unresolved type reference '{name}': the name is not registered in any namespace")]
    NameResolution { name: String },
}

/// The class-definition runtime: one namespace, one defining trust domain.
///
/// Single-threaded by design; `define` takes `&mut self` and each definition
/// runs to completion before the next begins.
#[derive(Debug)]
pub struct Runtime {
    namespace: Namespace,
    trust_domain: TrustDomain,
    next_hidden_id: u64,
    next_domain_id: u64,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            namespace: Namespace::new(),
            trust_domain: TrustDomain(0),
            next_hidden_id: 1,
            next_domain_id: 1,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The trust domain of the defining context, shared with every nestmate
    /// definition.
    pub fn trust_domain(&self) -> TrustDomain {
        self.trust_domain
    }

    /// Define a class from raw artifact bytes.
    ///
    /// The definition moves through `Unverified → Verified → Linked → Ready`;
    /// it can fail terminally at verification (malformed bytes) or at linking
    /// (an unresolved name). A hidden class's own name is resolvable at no
    /// point during or after this call.
    #[tracing::instrument(skip_all, fields(len = bytes.len(), hidden = options.hidden))]
    pub fn define(
        &mut self,
        bytes: &[u8],
        options: DefineOptions,
    ) -> Result<RegisteredType, DefinitionError> {
        // Unverified: bytes straight from the caller.
        let image =
            ClassImage::decode(bytes).map_err(|e| DefinitionError::MalformedBytes(e.to_string()))?;
        let verified = verify(image)?;
        let linked = self.link(verified, options)?;

        let class = Arc::new(linked);
        if !options.hidden {
            self.namespace.insert(Arc::clone(&class));
        }
        tracing::debug!(name = %class.runtime_name, "class ready");
        Ok(RegisteredType::new(class))
    }

    /// Verified → Linked: resolve every type reference and mint the runtime
    /// name and trust domain.
    fn link(&mut self, verified: Verified, options: DefineOptions) -> Result<LinkedClass, DefinitionError> {
        let image = verified.0;

        // A findable class may reference its own name: it is entered into
        // the namespace under that name as part of this definition. A hidden
        // class gets no entry, so the same reference has nothing to resolve
        // against.
        let resolve = |index: u16| -> Result<ResolvedType, DefinitionError> {
            match image.type_ref(index) {
                Some(TypeRef::Unit) => Ok(ResolvedType::Unit),
                Some(TypeRef::Int) => Ok(ResolvedType::Int),
                Some(TypeRef::Bool) => Ok(ResolvedType::Bool),
                Some(TypeRef::Str) => Ok(ResolvedType::Str),
                Some(TypeRef::Named(name)) => {
                    let resolvable = self.namespace.contains(name)
                        || (!options.hidden && *name == image.name);
                    if resolvable {
                        Ok(ResolvedType::Class(name.clone()))
                    } else {
                        Err(DefinitionError::NameResolution { name: name.clone() })
                    }
                }
                // Decoded images never have dangling indices; this arm only
                // guards hand-assembled images.
                None => Err(DefinitionError::MalformedBytes(format!(
                    "type index {} out of range",
                    index
                ))),
            }
        };

        let mut fields = Vec::with_capacity(image.fields.len());
        for field in &image.fields {
            fields.push((field.name.clone(), resolve(field.ty)?));
        }

        let mut methods = Vec::with_capacity(image.methods.len());
        for method in &image.methods {
            let mut params = Vec::with_capacity(method.params.len());
            for param in &method.params {
                params.push(resolve(*param)?);
            }
            methods.push(LinkedMethod {
                name: method.name.clone(),
                params,
                ret: resolve(method.ret)?,
                body: method.body.clone(),
            });
        }

        let hidden = options.hidden;
        let runtime_name = if hidden {
            let id = self.next_hidden_id;
            self.next_hidden_id += 1;
            format!("{}/{:#06x}", image.name, id)
        } else {
            image.name.clone()
        };
        let trust_domain = if options.nestmate {
            self.trust_domain
        } else {
            let id = self.next_domain_id;
            self.next_domain_id += 1;
            TrustDomain(id)
        };

        Ok(LinkedClass {
            declared_name: image.name,
            runtime_name,
            hidden,
            trust_domain,
            fields,
            methods,
        })
    }
}

/// A class image that passed structural verification.
struct Verified(ClassImage);

/// Unverified → Verified: structural rules beyond what the decoder enforces.
fn verify(image: ClassImage) -> Result<Verified, DefinitionError> {
    for (i, field) in image.fields.iter().enumerate() {
        if image.fields[..i].iter().any(|f| f.name == field.name) {
            return Err(DefinitionError::MalformedBytes(format!(
                "duplicate field '{}'",
                field.name
            )));
        }
    }
    for (i, method) in image.methods.iter().enumerate() {
        if image.methods[..i].iter().any(|m| m.name == method.name) {
            return Err(DefinitionError::MalformedBytes(format!(
                "duplicate method '{}'",
                method.name
            )));
        }
        let ret = image.type_ref(method.ret);
        let agrees = match (&method.body, ret) {
            (MethodBody::ReturnUnit, Some(TypeRef::Unit | TypeRef::Named(_))) => true,
            (MethodBody::ReturnInt(_), Some(TypeRef::Int)) => true,
            (MethodBody::ReturnBool(_), Some(TypeRef::Bool)) => true,
            (MethodBody::ReturnStr(_), Some(TypeRef::Str)) => true,
            _ => false,
        };
        if !agrees {
            return Err(DefinitionError::MalformedBytes(format!(
                "method '{}' body does not match its declared return type",
                method.name
            )));
        }
    }
    Ok(Verified(image))
}
