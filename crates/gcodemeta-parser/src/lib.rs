//! # gcodemeta parser
//!
//! The extraction pipeline: file name heuristics, head/tail comment block
//! scanning, slicer dialect matchers, the quick and full parsers, and the
//! merge that combines them.
//!
//! ```ignore
//! use gcodemeta_parser::Extractor;
//!
//! let extraction = Extractor::standard().extract_path(Path::new("benchy.gcode"))?;
//! for (name, value) in extraction.record.values() {
//!     println!("{name}: {value}");
//! }
//! ```

mod builder;
pub mod dialect;
pub mod extractor;
pub mod filename;
pub mod full;
pub mod merge;
pub mod quick;
pub mod reader;
pub mod scanner;
pub mod thumbnail;

pub use dialect::{
    Capture, CuraMatcher, DialectMatch, DialectMatcher, MatcherHandle, MatcherRegistry,
    PrusaSlicerMatcher, Simplify3dMatcher,
};
pub use extractor::{Extraction, Extractor, ParseStage};
pub use filename::{is_gcode_path, FilenameHeuristics, GCODE_EXTENSIONS};
pub use full::{FullParse, FullParser};
pub use merge::merge;
pub use quick::{QuickParse, QuickParser};
pub use reader::{FileReadStats, GcodeFileReader};
pub use scanner::{CommentBlock, CommentBlockScanner, CommentLine, Region, ScannedBlocks};
pub use thumbnail::{Thumbnail, ThumbnailCollector, ThumbnailFormat};
