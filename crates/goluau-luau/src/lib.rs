//! Luau target tree for goluau.
//!
//! The lowering pass in `goluau-transform` builds [`Stmt`]/[`Expr`] trees; this
//! crate renders them. A module's declarations are grouped in a [`File`] and
//! rendered with [`render_module`], which applies the fixed phase ordering
//! (raw text, declarations, functions, everything else).

pub mod ast;
pub mod file;
pub mod render;
pub mod token;
pub mod writer;

pub use ast::*;
pub use file::{File, Phase, phase_order, render_module, render_module_with};
pub use render::{Render, quote, quote_bytes};
pub use token::{Operator, Scope};
pub use writer::{RenderOptions, Writer};
