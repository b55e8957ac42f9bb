pub mod fit;
pub mod image_page;
pub mod merge;
pub mod unlock;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
