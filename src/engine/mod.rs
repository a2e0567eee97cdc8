//! Engine module: hash primitives, signing stages, and the CLI layer

pub mod arg_parser;
pub mod cli;
pub mod combine;
pub mod digest_lock;
pub mod hashing;
pub mod item_workers;
pub mod multi_hash;
pub mod progress;
pub mod single_hash;
pub mod slots;
pub mod source;
pub mod workload;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use combine::{CombineResults, combine_results};
pub use digest_lock::{DigestLock, DigestPermit};
pub use hashing::{Signer, StdSigner, crc32_of_md5};
pub use multi_hash::{MultiHash, multi_hash};
pub use single_hash::{SingleHash, single_hash};
pub use slots::{SlotArena, SlotError};
pub use workload::{execute_signing, signing_stages};
