//! phishnet - Phishing URL classifier
//!
//! Turns a raw URL into a fixed, versioned feature vector and classifies it
//! with a gradient-boosted tree ensemble. The same extractor builds the
//! training tables and serves single-URL inference.
//!
//! ```no_run
//! use phishnet::{classifier, FeatureSchema, TrainedModel};
//!
//! let model = TrainedModel::load("models/tuned_model.json".as_ref())?;
//! let prediction = classifier::classify(&model, &FeatureSchema::reference(), "http://paypa1.tk/signin")?;
//! println!("{}", prediction.label);
//! # Ok::<(), phishnet::PhishError>(())
//! ```

pub mod classifier;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod models;
pub mod probe;
pub mod schema;

pub use classifier::{Prediction, TrainedModel};
pub use error::{PhishError, PhishResult};
pub use extract::{assemble, extract, FeatureVector};
pub use models::Label;
pub use schema::FeatureSchema;
