#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use,
    clippy::cast_precision_loss
)]

pub mod assess;
pub mod candidate;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod enrich;
pub mod error;
pub mod llm;
pub mod observability;
pub mod pipeline;

pub use config::Config;
pub use error::CuratorError;
