//! Go to Luau lowering.
//!
//! [`lower_source`] turns one Go file into Luau declarations;
//! [`synthesize_exports`] builds the module's export table; [`translate`]
//! does both and renders a single-file module.
//!
//! ```ignore
//! let luau = goluau_transform::translate("main.go", "package main\nfunc main() { print(\"hi\") }")?;
//! ```

mod error;
mod exports;
mod lower;
mod options;
pub mod source;

pub use error::{Position, TranslateError};
pub use exports::synthesize_exports;
pub use lower::{Lowerer, lower_source, lower_source_with};
pub use options::TransformOptions;

use goluau_luau::{File, RenderOptions, render_module_with};

/// Lower, export and render one file as a complete module.
pub fn translate(file_name: &str, source: &str) -> Result<String, TranslateError> {
    translate_with(
        file_name,
        source,
        &TransformOptions::default(),
        &RenderOptions::default(),
    )
}

pub fn translate_with(
    file_name: &str,
    source: &str,
    options: &TransformOptions,
    render: &RenderOptions,
) -> Result<String, TranslateError> {
    let module = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let mut file = File::new(module, "");
    file.extend(lower_source_with(file_name, source, options)?);
    let exports = synthesize_exports(file.decls());
    file.push(exports);
    Ok(render_module_with(&file, render))
}
