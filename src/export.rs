use crate::error::ExportSinkError;

/// File name every saved artwork is delivered under
pub const EXPORT_FILE_NAME: &str = "paint-artwork.png";

/// Destination for exported PNG bytes
pub trait ExportSink {
    /// Hand `png` to the user under `file_name`. Returns a human-readable
    /// description of where it went.
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> Result<String, ExportSinkError>;
}

/// Writes exports into a directory on disk
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSink {
    pub fn new(directory: impl Into<std::path::PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ExportSink for FileSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> Result<String, ExportSinkError> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(file_name);
        std::fs::write(&path, png)?;
        log::info!("Wrote {} bytes to {}", png.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// Triggers a browser download through a temporary anchor element
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone)]
pub struct DownloadSink;

#[cfg(target_arch = "wasm32")]
impl ExportSink for DownloadSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> Result<String, ExportSinkError> {
        use eframe::wasm_bindgen::JsCast as _;

        let browser = |err: eframe::wasm_bindgen::JsValue| ExportSinkError::Browser(format!("{err:?}"));

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ExportSinkError::Browser("no document".to_owned()))?;

        let bytes = js_sys::Uint8Array::from(png);
        let parts = js_sys::Array::new();
        parts.push(&bytes.buffer());
        let blob = web_sys::Blob::new_with_u8_array_sequence(&parts).map_err(browser)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(browser)?;

        let anchor = document
            .create_element("a")
            .map_err(browser)?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| ExportSinkError::Browser("not an anchor element".to_owned()))?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();
        web_sys::Url::revoke_object_url(&url).map_err(browser)?;

        log::info!("Started download of {} ({} bytes)", file_name, png.len());
        Ok(file_name.to_owned())
    }
}

/// Keeps every delivery in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub deliveries: Vec<(String, Vec<u8>)>,
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> Result<String, ExportSinkError> {
        self.deliveries.push((file_name.to_owned(), png.to_vec()));
        Ok(format!("memory:{file_name}"))
    }
}
