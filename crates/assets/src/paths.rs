//! Fixed asset locations, relative to the asset root.

use std::path::{Path, PathBuf};

/// Number of matcap textures, keyed 1..=MATCAP_COUNT.
pub const MATCAP_COUNT: u32 = 8;

/// Font description file. The leading slash means "asset root".
pub const FONT_PATH: &str = "/fonts/helvetiker_regular.typeface.json";

pub fn matcap_path(key: u32) -> String {
    format!("textures/matcaps/{key}.png")
}

/// Join an asset path onto the root, treating absolute asset paths as
/// root-relative.
pub fn resolve(root: &Path, asset: &str) -> PathBuf {
    root.join(asset.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcap_paths() {
        assert_eq!(matcap_path(1), "textures/matcaps/1.png");
        assert_eq!(matcap_path(8), "textures/matcaps/8.png");
    }

    #[test]
    fn resolve_strips_leading_slash() {
        let p = resolve(Path::new("static"), FONT_PATH);
        assert_eq!(
            p,
            Path::new("static/fonts/helvetiker_regular.typeface.json")
        );
        let p = resolve(Path::new("static"), &matcap_path(3));
        assert_eq!(p, Path::new("static/textures/matcaps/3.png"));
    }
}
