//! In-memory fixtures for tests: small PDFs, encrypted PDFs and images.

use std::io::Cursor;

use image::ImageFormat;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Creates a PDF with `num_pages` pages, each showing `<prefix>-Page-<n>`
pub fn create_test_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    let mut doc = build_test_document(num_pages, prefix);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to save test PDF");
    buffer
}

/// Creates a one page PDF that can only be opened with `password`
pub fn create_locked_pdf(password: &str) -> Vec<u8> {
    encrypt_test_pdf(password, password)
}

/// Creates a one page PDF carrying only an owner password.
/// Anyone can open it, the encryption just restricts permissions.
pub fn create_owner_locked_pdf(owner_password: &str) -> Vec<u8> {
    encrypt_test_pdf(owner_password, "")
}

/// Creates a solid PNG of the given pixel size
pub fn create_png(width: u32, height: u32) -> Vec<u8> {
    create_image(width, height, ImageFormat::Png)
}

/// Creates a solid image of the given pixel size, encoded as `format`
pub fn create_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut data), format)
        .expect("Failed to encode test image");
    data
}

/// The `(...)` label shown on every page, in page order.
/// Pages without text yield an empty label.
pub fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).unwrap_or_default();
            let content = String::from_utf8_lossy(&content);
            match (content.find('('), content.find(')')) {
                (Some(start), Some(end)) if start < end => content[start + 1..end].to_owned(),
                _ => String::new(),
            }
        })
        .collect()
}

/// Whether the page resources reference any XObject
pub fn page_has_image(doc: &Document, page_id: ObjectId) -> bool {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return false;
    };
    let resources = match page.get(b"Resources") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id),
        Ok(object) => object.as_dict(),
        Err(e) => Err(e),
    };
    resources.map(|res| res.has(b"XObject")).unwrap_or(false)
}

fn encrypt_test_pdf(owner_password: &str, user_password: &str) -> Vec<u8> {
    let mut doc = build_test_document(1, "Locked");

    // Encryption needs a file identifier in the trailer
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::string_literal("0123456789abcdef"),
            Object::string_literal("fedcba9876543210"),
        ]),
    );

    let encryption_version = lopdf::EncryptionVersion::V2 {
        document: &doc,
        owner_password,
        user_password,
        key_length: 128,
        permissions: lopdf::Permissions::all(),
    };
    let encryption_state = lopdf::EncryptionState::try_from(encryption_version)
        .expect("Failed to build encryption state");
    doc.encrypt(&encryption_state)
        .expect("Failed to encrypt test PDF");

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .expect("Failed to save locked test PDF");
    buffer
}

fn build_test_document(num_pages: u32, prefix: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for page_num in 1..=num_pages {
        let content = format!("BT /F1 12 Tf 50 700 Td ({prefix}-Page-{page_num}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}
