//! Dataset vocabulary shared by the organizer and the analyzer.
//!
//! The only contract between the two halves of the tool is the on-disk
//! layout described here:
//!
//! ```text
//! <root>/images/{train,val,test}/<basename>.<ext>
//! <root>/labels/{train,val,test}/<basename>.txt
//! ```
//!
//! plus the generated `data.yaml` configuration record.
//!
//! # Example
//!
//! ```
//! use fasdd_prep::dataset::{parse_line, ClassSchema, LineOutcome};
//!
//! let schema = ClassSchema::default();
//! match parse_line("0 0.5 0.5 0.2 0.4") {
//!     LineOutcome::Record(record) => assert!(schema.contains(record.class_id)),
//!     _ => unreachable!(),
//! }
//! ```

mod annotation;
mod layout;
pub mod manifest;
mod schema;
mod split;

pub use annotation::{parse_line, AnnotationRecord, LineOutcome, ASPECT_EPSILON};
#[cfg(feature = "fuzzing")]
pub use annotation::fuzz_parse_line;
pub use layout::{
    collect_files, has_extension, read_data_yaml, write_data_yaml, DataYaml, DatasetLayout,
    IMAGE_EXTENSIONS, LABEL_EXTENSION,
};
pub use schema::ClassSchema;
pub use split::Split;
