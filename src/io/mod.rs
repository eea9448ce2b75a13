//! File I/O for latents, codebooks and encoding results (JSON)

mod load;
mod records;
mod save;

#[cfg(test)]
mod tests;

pub use load::{load_codebook, load_json, load_latents};
pub use records::{EncodingRecord, LatentFile};
pub use save::{save_codebook, save_json};
