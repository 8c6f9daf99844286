//! jwtkeys
//!
//! Signing and verifying JWTs with several keys at once.
//! It covers three pieces:
//!
//! - **Single-key signing and parsing** (`Signer`, `Parser`) for HS*, RS*, PS* and ES*
//!   algorithms, with the parser pinned to exactly one algorithm
//! - **A key registry** (`KeyRegistry`) mapping kids to key material, safe to share
//!   between threads, which can also sign and verify tokens that carry their kid in
//!   the header
//! - **Multi-key dispatch** (`MultiKeySigner`, `MultiKeyParser`) where the kid travels
//!   inside the signed claims and selects the parser
//!
//! ## Quick start
//! ```no_run
//! use jwtkeys::{Algorithm, Claim, MultiKeyParser, MultiKeySigner, Parser, ParserOptions, Signer};
//!
//! # fn demo() -> jwtkeys::Result<()> {
//! let signers = MultiKeySigner::new();
//! signers.set("api", Signer::from_file(Algorithm::RS256, "keys/api.pem")?)?;
//!
//! let parsers = MultiKeyParser::new();
//! parsers.set(
//!     "api",
//!     Parser::from_file(Algorithm::RS256, "keys/api.pub.pem", ParserOptions::default())?,
//! )?;
//!
//! let token = signers.signed_string("api", [Claim::new("uid", "1"), Claim::new("count", 100)])?;
//! let claims = parsers.parse(&token)?;
//! println!("uid={:?} kid={:?}", claims.get_str("uid"), claims.get_str("kid"));
//! # Ok(()) }
//! ```

#![forbid(unsafe_code)]

mod algorithm;
mod claims;
mod crypto;
mod error;
mod key;
mod multi;
mod parser;
mod registry;
mod signer;
mod token;

pub use algorithm::{Algorithm, AlgorithmFamily};
pub use claims::{Claim, ClaimSet};
pub use error::{Error, Result};
pub use key::{Key, read_key};
pub use multi::{KID_CLAIM, MultiKeyParser, MultiKeySigner};
pub use parser::{Parser, ParserOptions};
pub use registry::{KeyRegistry, RegistryToken};
pub use signer::Signer;
pub use token::parse_claims_unverified;
