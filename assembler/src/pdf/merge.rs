use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;
use tracing::instrument;

use crate::pdf::fit::{FitError, PageSize};
use crate::pdf::image_page::{ImagePageError, image_to_pdf};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound when walking `/Parent` links, guards against cyclic page trees.
const MAX_PAGE_TREE_DEPTH: usize = 64;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("At least two files are required to merge")]
    InsufficientInputs,
    #[error("Could not read file `{name}`. reason=`{reason}`")]
    MalformedInput { name: String, reason: String },
    #[error("File `{name}` is password protected. Unlock it before merging")]
    LockedInput { name: String },
    #[error("Image `{name}` has invalid dimensions")]
    InvalidDimensions {
        name: String,
        #[source]
        source: FitError,
    },
    #[error("Cannot assemble final PDF. reason=`{0}`")]
    SerializationFailed(String),
}

/// A single uploaded file, in the order it should appear in the output.
#[derive(Debug, Clone)]
pub struct InputItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputItem {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Files are told apart by their extension only, no content sniffing.
    /// Anything not named `*.pdf` (case-insensitive) is treated as an image.
    pub fn is_pdf(&self) -> bool {
        self.name.to_lowercase().ends_with(".pdf")
    }
}

/// Merge every item into a single PDF, in the given order.
/// PDFs contribute all of their pages, images one A4 page each.
///
/// Each call works on its own accumulator and nothing is returned
/// unless every item could be appended.
#[instrument(skip(items), fields(items = items.len()))]
pub fn assemble(items: &[InputItem]) -> Result<Vec<u8>, MergeError> {
    if items.len() < 2 {
        return Err(MergeError::InsufficientInputs);
    }

    let mut assembler = DocumentAssembler::new();
    for item in items {
        assembler.append(item)?;
    }

    assembler.finish()
}

/// Accumulates pages from several documents into one output document.
///
/// Implementation inspired on the reference example from the [lopdf repo here.](https://github.com/J-F-Liu/lopdf/blob/c320c1d9d90028ee64e668f0bbbe9815fae3fb44/examples/merge.rs)
pub struct DocumentAssembler {
    document: Document,
    /// Page IDs in output order
    pages: Vec<ObjectId>,
    page_size: PageSize,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAssembler {
    /// Creates an empty accumulator placing images on A4 pages
    pub fn new() -> Self {
        Self::with_page_size(PageSize::A4)
    }

    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            document: Document::with_version("1.7"),
            pages: Vec::new(),
            page_size,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append an item, dispatching on its file extension
    pub fn append(&mut self, item: &InputItem) -> Result<(), MergeError> {
        if item.is_pdf() {
            self.append_pdf(&item.name, &item.bytes)
        } else {
            self.append_image(&item.name, &item.bytes)
        }
    }

    /// Append all pages of the given PDF.
    /// Fails for password protected documents.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn append_pdf(&mut self, name: &str, bytes: &[u8]) -> Result<(), MergeError> {
        let doc = Document::load_mem(bytes).map_err(|e| MergeError::MalformedInput {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;

        // Documents with an empty user password are decrypted while loading,
        // whatever is still encrypted needs a real password.
        if doc.is_encrypted() {
            tracing::info!("Refusing to merge locked PDF. name={name}");
            return Err(MergeError::LockedInput {
                name: name.to_owned(),
            });
        }

        self.append_document(name, doc)
    }

    /// Wrap an image into a single page and append it.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn append_image(&mut self, name: &str, bytes: &[u8]) -> Result<(), MergeError> {
        let pdf_bytes = image_to_pdf(bytes, self.page_size).map_err(|e| match e {
            ImagePageError::InvalidDimensions(source) => MergeError::InvalidDimensions {
                name: name.to_owned(),
                source,
            },
            ImagePageError::BadImageDecoding(reason) => MergeError::MalformedInput {
                name: name.to_owned(),
                reason,
            },
        })?;

        let doc = Document::load_mem(&pdf_bytes).map_err(|e| MergeError::MalformedInput {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;

        self.append_document(name, doc)
    }

    /// Move every page of `doc`, and all objects they depend on, into the accumulator.
    fn append_document(&mut self, name: &str, mut doc: Document) -> Result<(), MergeError> {
        let malformed = |e: lopdf::Error| MergeError::MalformedInput {
            name: name.to_owned(),
            reason: e.to_string(),
        };

        // Renumber objects to avoid conflicts with what we already hold
        doc.renumber_objects_with(self.document.max_id + 1);

        // `get_pages` is keyed by page number, so this is the document order
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let last_id = doc
            .objects
            .keys()
            .map(|(id, _)| *id)
            .max()
            .unwrap_or(doc.max_id);

        // The source page tree is dropped below, so pages must carry
        // whatever they were inheriting from it.
        for page_id in &page_ids {
            inherit_page_attributes(&mut doc, *page_id).map_err(malformed)?;
        }

        for (object_id, object) in doc.objects.into_iter() {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" => {
                    // No-op: Skip these, the output gets its own page tree
                }
                _ => {
                    self.document.objects.insert(object_id, object);
                }
            }
        }

        self.document.max_id = self.document.max_id.max(last_id);
        tracing::debug!(
            "Appended document. name={name} pages={} total_pages={}",
            page_ids.len(),
            self.pages.len() + page_ids.len()
        );
        self.pages.extend(page_ids);

        Ok(())
    }

    /// Build the catalog and page tree, and serialize the accumulated document.
    #[instrument(skip(self), fields(pages = self.pages.len()))]
    pub fn finish(mut self) -> Result<Vec<u8>, MergeError> {
        let pages_id = self.document.new_object_id();

        for page_id in &self.pages {
            let page = self
                .document
                .get_object_mut(*page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| MergeError::SerializationFailed(e.to_string()))?;
            page.set("Parent", pages_id);
        }

        let kids: Vec<Object> = self
            .pages
            .iter()
            .map(|&page_id| Object::Reference(page_id))
            .collect();

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", self.pages.len() as i64);
        pages_dict.set("Kids", kids);
        self.document
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", pages_id);
        let catalog_id = self.document.add_object(catalog);
        self.document.trailer.set("Root", catalog_id);

        self.document.compress();

        let mut buffer = Vec::new();
        self.document
            .save_to(&mut buffer)
            .map_err(|e| MergeError::SerializationFailed(e.to_string()))?;

        tracing::info!(
            "Merged PDF assembled. pages={} size={}",
            self.pages.len(),
            buffer.len()
        );
        Ok(buffer)
    }
}

/// Copy inheritable attributes from the ancestors of `page_id` onto the page itself,
/// unless the page already defines them.
fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) -> Result<(), lopdf::Error> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&[u8]> = INHERITABLE_PAGE_KEYS
        .into_iter()
        .filter(|key| !page.has(key))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut inherited: Vec<(Vec<u8>, Object)> = Vec::new();

    let mut depth = 0;
    while let Some(parent_id) = parent
        && !missing.is_empty()
        && depth < MAX_PAGE_TREE_DEPTH
    {
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }

    Ok(())
}
