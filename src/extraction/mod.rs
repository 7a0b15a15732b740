//! Receipt extraction boundary
//!
//! A receipt image goes out to an external extractor together with the list
//! of expense categories it may choose from; a loosely-typed list of line
//! items comes back. Nothing returned here is trusted: the reconciliation
//! service normalizes it before anything reaches the ledger.

pub mod provider;

pub use provider::{CommandExtractor, ResponseFileExtractor};

use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{TallyError, TallyResult};
use crate::models::Category;

/// A category the extractor may assign items to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryHint {
    pub category_id: String,
    pub category_name: String,
}

impl From<&Category> for CategoryHint {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.id.to_string(),
            category_name: category.name.clone(),
        }
    }
}

/// What the extractor receives
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    /// Raw image bytes, sent base64-encoded
    #[serde(serialize_with = "serialize_base64")]
    pub image: Vec<u8>,
    pub mime_type: String,
    pub categories: Vec<CategoryHint>,
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    use base64::{engine::general_purpose::STANDARD, Engine};
    serializer.serialize_str(&STANDARD.encode(bytes))
}

impl ExtractionRequest {
    pub fn new<'c>(
        image: Vec<u8>,
        mime_type: impl Into<String>,
        categories: impl IntoIterator<Item = &'c Category>,
    ) -> Self {
        Self {
            image,
            mime_type: mime_type.into(),
            categories: categories.into_iter().map(CategoryHint::from).collect(),
        }
    }

    pub fn to_json(&self) -> TallyResult<String> {
        serde_json::to_string(self)
            .map_err(|e| TallyError::Extraction(format!("Failed to encode request: {}", e)))
    }
}

/// Guess a mime type from an image path's extension
pub fn mime_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("pdf") => "application/pdf",
        _ => "image/jpeg",
    }
}

/// One line item as the extractor reported it
///
/// Every field is optional and `amount` is kept as raw JSON so a string or
/// null does not reject the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub amount: Option<serde_json::Value>,
    pub note: Option<String>,
    #[serde(rename = "categoryId", alias = "category_id")]
    pub category_id: Option<String>,
}

/// The extractor's response before normalization
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawExtraction {
    pub date: Option<String>,
    pub items: Option<Vec<RawItem>>,
}

impl RawExtraction {
    pub fn from_json(json: &str) -> TallyResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TallyError::Extraction(format!("Unreadable response: {}", e)))
    }
}

/// Something that can turn a receipt image into line items
pub trait ReceiptExtractor {
    fn extract(&self, request: &ExtractionRequest) -> TallyResult<RawExtraction>;
}

/// An extraction running on a worker thread
pub struct PendingExtraction {
    receiver: mpsc::Receiver<TallyResult<RawExtraction>>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Run `extractor` on a worker thread so the caller stays responsive
pub fn spawn_extraction<E>(extractor: E, request: ExtractionRequest) -> PendingExtraction
where
    E: ReceiptExtractor + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let handle = thread::spawn(move || {
        debug!(bytes = request.image.len(), mime = %request.mime_type, "extraction started");
        let result = extractor.extract(&request);
        let _ = sender.send(result);
    });

    PendingExtraction {
        receiver,
        handle: Some(handle),
    }
}

impl PendingExtraction {
    /// The result if the worker has finished, without blocking
    pub fn try_take(&mut self) -> Option<TallyResult<RawExtraction>> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.join();
                Some(Err(worker_lost()))
            }
        }
    }

    /// Block until the worker finishes
    pub fn wait(mut self) -> TallyResult<RawExtraction> {
        let result = self.receiver.recv().unwrap_or_else(|_| Err(worker_lost()));
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_lost() -> TallyError {
    TallyError::Extraction("extraction worker stopped without a result".into())
}
