//! AST for the `.vc` fixture source language.

use std::fmt;

/// A parsed class source: one class, its fields, its methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeAnnotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<(String, TypeAnnotation)>,
    pub ret: TypeAnnotation,
    pub body: ReturnStmt,
}

/// A type annotation as written in source. `Named` covers any class
/// reference, including a class naming itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAnnotation {
    Unit,
    Int,
    Bool,
    Str,
    Named(String),
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::Unit => write!(f, "Unit"),
            TypeAnnotation::Int => write!(f, "Int"),
            TypeAnnotation::Bool => write!(f, "Bool"),
            TypeAnnotation::Str => write!(f, "Str"),
            TypeAnnotation::Named(name) => write!(f, "{}", name),
        }
    }
}

/// The single statement a method body contains.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnStmt {
    Unit,
    Int(i64),
    Bool(bool),
    Str(String),
}
