//! Declarative quantizer configuration
//!
//! Quantizers are described in YAML, validated, and built into trait
//! objects:
//!
//! ```yaml
//! seed: 42
//! quantizer:
//!   type: vector
//!   embed_dim: 32
//!   n_embed: 512
//!   beta: 0.25
//! fit:
//!   steps: 200
//!   lr: 0.1
//! ```

mod builder;
mod cli;
mod schema;
mod validate;

pub use builder::{build_optimizer, build_quantizer, build_with_codebook};
pub use cli::{parse_args, Cli, Command, EncodeArgs, FitArgs, InfoArgs, ValidateArgs};
pub use schema::{FitSpec, GumbelSpec, QuantizerConfig, QuantizerSpec, VectorSpec};
pub use validate::{validate_config, validate_fit, validate_quantizer};
