//! Output generation.
//!
//! # Submodules
//!
//! - [`artifact`]: Base64-encodes a merged feed and writes it to disk
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── Clash.txt   # Base64 of the merged multi-document YAML
//! └── V2ray.txt   # Base64 of the merged URI list
//! ```

pub mod artifact;
