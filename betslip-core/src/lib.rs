// Betslip Core Library
//
// Extracts one arbitrage opportunity from the text layer of a betting slip.
// Main interface for converting slip documents to a MatchRecord.

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod error;
pub mod preprocessors;
pub mod processor;
pub mod rules;
pub mod scanner;
pub mod types;

// Re-export main types and functions for easy use
pub use assembler::RecordAssembler;
pub use catalog::HouseCatalog;
pub use config::ParsingConfig;
pub use error::{panic_message, SlipError};
pub use preprocessors::{PdfPreprocessor, Preprocessor, TextPreprocessor};
pub use processor::{DocumentProcessor, PipelineStages, StepProfiler};
pub use rules::RuleEngine;
pub use scanner::LineScanner;
pub use types::*;
