pub mod pdf;

pub use pdf::fit::{FitError, PageSize, PlacementRect, fit};
pub use pdf::merge::{DocumentAssembler, InputItem, MergeError, assemble};
pub use pdf::unlock::{UnlockError, unlock};
