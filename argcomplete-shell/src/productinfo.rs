//! Information about this project, used in `--version` output and the
//! default product string in shellcode headers.

/// The formal name of this product.
pub const PRODUCT_NAME: &str = "argcomplete-rs";

/// The version of the product, in string form.
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");
