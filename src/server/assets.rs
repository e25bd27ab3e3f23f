//! Static client assets (the single-page HTML client and its stylesheet).

use std::path::Path;

use bytes::Bytes;

use crate::error::AssetError;

/// File name of the client page inside a client directory.
pub const INDEX_FILE: &str = "client.html";

/// File name of the stylesheet inside a client directory.
pub const STYLE_FILE: &str = "style.css";

/// Client files served at `/` and `/style.css`.
#[derive(Debug, Clone)]
pub struct ClientAssets {
    pub index_html: Bytes,
    pub style_css: Bytes,
}

impl ClientAssets {
    /// Assets compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            index_html: Bytes::from_static(include_bytes!("../../client/client.html")),
            style_css: Bytes::from_static(include_bytes!("../../client/style.css")),
        }
    }

    /// Read `client.html` and `style.css` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, AssetError> {
        Ok(Self {
            index_html: read_asset(&dir.join(INDEX_FILE))?,
            style_css: read_asset(&dir.join(STYLE_FILE))?,
        })
    }
}

impl Default for ClientAssets {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_asset(path: &Path) -> Result<Bytes, AssetError> {
    std::fs::read(path)
        .map(Bytes::from)
        .map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })
}
