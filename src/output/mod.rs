pub mod index;
pub mod progress;
pub mod scan;

/// Convert a string into a tree label.
fn tree_label<S: Into<String>>(s: S) -> String {
    s.into()
}
