//! Emitter from the parsed AST to the veil class format.

use thiserror::Error;
use veil_format::{ClassImage, FieldDef, MethodBody, MethodDef, TypeRef};

use super::ast::{ClassDecl, ReturnStmt, TypeAnnotation};

/// Semantic errors caught before an image is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("duplicate field '{0}'")]
    DuplicateField(String),
    #[error("duplicate method '{0}'")]
    DuplicateMethod(String),
    #[error("method '{method}' declares return type {declared} but returns a {found} literal")]
    ReturnTypeMismatch {
        method: String,
        declared: String,
        found: &'static str,
    },
}

/// Lower a class declaration into a [`ClassImage`].
///
/// Type annotations are interned into the image's type pool; a class naming
/// itself produces a `Named` pool entry like any other class reference —
/// whether that name resolves is decided at link time, not here.
pub fn emit(decl: &ClassDecl) -> Result<ClassImage, EmitError> {
    let mut types: Vec<TypeRef> = Vec::new();
    let mut intern = |annotation: &TypeAnnotation| -> u16 {
        let ty = type_ref(annotation);
        match types.iter().position(|t| *t == ty) {
            Some(index) => index as u16,
            None => {
                types.push(ty);
                (types.len() - 1) as u16
            }
        }
    };

    let mut fields = Vec::new();
    for field in &decl.fields {
        if decl.fields.iter().filter(|f| f.name == field.name).count() > 1 {
            return Err(EmitError::DuplicateField(field.name.clone()));
        }
        fields.push(FieldDef {
            name: field.name.clone(),
            ty: intern(&field.ty),
        });
    }

    let mut methods = Vec::new();
    for method in &decl.methods {
        if decl.methods.iter().filter(|m| m.name == method.name).count() > 1 {
            return Err(EmitError::DuplicateMethod(method.name.clone()));
        }
        check_return(method.name.as_str(), &method.ret, &method.body)?;
        methods.push(MethodDef {
            name: method.name.clone(),
            params: method.params.iter().map(|(_, ty)| intern(ty)).collect(),
            ret: intern(&method.ret),
            body: body(&method.body),
        });
    }

    Ok(ClassImage {
        name: decl.name.clone(),
        types,
        fields,
        methods,
    })
}

fn type_ref(annotation: &TypeAnnotation) -> TypeRef {
    match annotation {
        TypeAnnotation::Unit => TypeRef::Unit,
        TypeAnnotation::Int => TypeRef::Int,
        TypeAnnotation::Bool => TypeRef::Bool,
        TypeAnnotation::Str => TypeRef::Str,
        TypeAnnotation::Named(name) => TypeRef::Named(name.clone()),
    }
}

fn body(stmt: &ReturnStmt) -> MethodBody {
    match stmt {
        ReturnStmt::Unit => MethodBody::ReturnUnit,
        ReturnStmt::Int(value) => MethodBody::ReturnInt(*value),
        ReturnStmt::Bool(value) => MethodBody::ReturnBool(*value),
        ReturnStmt::Str(value) => MethodBody::ReturnStr(value.clone()),
    }
}

fn check_return(
    method: &str,
    declared: &TypeAnnotation,
    body: &ReturnStmt,
) -> Result<(), EmitError> {
    let matches = match (declared, body) {
        (TypeAnnotation::Unit, ReturnStmt::Unit) => true,
        (TypeAnnotation::Int, ReturnStmt::Int(_)) => true,
        (TypeAnnotation::Bool, ReturnStmt::Bool(_)) => true,
        (TypeAnnotation::Str, ReturnStmt::Str(_)) => true,
        // A bare `return` is the null value for a class-typed return.
        (TypeAnnotation::Named(_), ReturnStmt::Unit) => true,
        _ => false,
    };
    if matches {
        Ok(())
    } else {
        Err(EmitError::ReturnTypeMismatch {
            method: method.to_string(),
            declared: declared.to_string(),
            found: match body {
                ReturnStmt::Unit => "unit",
                ReturnStmt::Int(_) => "Int",
                ReturnStmt::Bool(_) => "Bool",
                ReturnStmt::Str(_) => "Str",
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{FieldDecl, MethodDecl};

    fn class(name: &str) -> ClassDecl {
        ClassDecl {
            name: name.to_string(),
            fields: vec![],
            methods: vec![],
        }
    }

    #[test]
    fn interns_repeated_types_once() {
        let mut decl = class("A");
        decl.fields.push(FieldDecl {
            name: "x".to_string(),
            ty: TypeAnnotation::Int,
        });
        decl.fields.push(FieldDecl {
            name: "y".to_string(),
            ty: TypeAnnotation::Int,
        });
        let image = emit(&decl).unwrap();
        assert_eq!(image.types, vec![TypeRef::Int]);
        assert_eq!(image.fields[0].ty, image.fields[1].ty);
    }

    #[test]
    fn self_reference_becomes_a_named_pool_entry() {
        let mut decl = class("NonFindableField");
        decl.fields.push(FieldDecl {
            name: "next".to_string(),
            ty: TypeAnnotation::Named("NonFindableField".to_string()),
        });
        let image = emit(&decl).unwrap();
        assert_eq!(
            image.types,
            vec![TypeRef::Named("NonFindableField".to_string())]
        );
    }

    #[test]
    fn rejects_duplicate_fields() {
        let mut decl = class("A");
        for _ in 0..2 {
            decl.fields.push(FieldDecl {
                name: "x".to_string(),
                ty: TypeAnnotation::Int,
            });
        }
        assert_eq!(
            emit(&decl),
            Err(EmitError::DuplicateField("x".to_string()))
        );
    }

    #[test]
    fn rejects_return_type_mismatch() {
        let mut decl = class("A");
        decl.methods.push(MethodDecl {
            name: "test".to_string(),
            params: vec![],
            ret: TypeAnnotation::Int,
            body: ReturnStmt::Unit,
        });
        assert!(matches!(
            emit(&decl),
            Err(EmitError::ReturnTypeMismatch { .. })
        ));
    }

    #[test]
    fn compiled_image_encodes() {
        let source = "\
class NonFindable

method test() -> Int:
    return 42
";
        let image = crate::compiler::compile_source(source).unwrap();
        let bytes = image.encode().unwrap();
        assert_eq!(ClassImage::decode(&bytes).unwrap(), image);
    }
}
