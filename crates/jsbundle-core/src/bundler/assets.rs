//! Static assets.
//!
//! Any import that is not a `.js` file is copied into the output
//! directory under its module id. The module it stands for evaluates to
//! the emitted file name, through both `require` and `import`.

use crate::error::Error;
use jsbundle_parser::create_var_name_from_path;
use std::path::Path;

/// Whether `path` goes through the JavaScript pipeline.
#[must_use]
pub fn is_script(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("js"))
}

/// Output file name for an asset: its module id plus the original
/// extension, e.g. `img/logo.png` becomes `img_logo_png.png`.
#[must_use]
pub fn asset_file_name(path: &str) -> String {
    let id = create_var_name_from_path(path);
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{id}.{ext}"),
        None => id,
    }
}

/// The module factory registered for an asset.
#[must_use]
pub fn asset_module_code(path: &str) -> String {
    let id = create_var_name_from_path(path);
    let file_name = asset_file_name(path);
    format!(
        "moduleFns.{id}=function(){{return {{exports:'{file_name}',es6:{{default:'{file_name}'}},hasES6Exports:true}};}};"
    )
}

/// Copy the asset at `root/path` into `out_dir`, returning its module
/// factory and the emitted file name.
pub fn load_asset(root: &Path, out_dir: &Path, path: &str) -> Result<(String, String), Error> {
    let file_name = asset_file_name(path);
    std::fs::create_dir_all(out_dir)?;
    std::fs::copy(root.join(path), out_dir.join(&file_name))?;
    Ok((asset_module_code(path), file_name))
}
