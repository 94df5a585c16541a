//! # planner-share
//!
//! Turns a JSON record into a compact, URL-safe share token with a fixed
//! validity window, and back. The token is raw DEFLATE output encoded as
//! unpadded base64url; that byte format is the compatibility contract with
//! links generated earlier and must not change.
//!
//! Nothing here panics on bad input: encoding reports [`ShareError`] and
//! decoding returns a [`DecodeOutcome`] that separates live, expired and
//! corrupt tokens.

pub mod codec;
pub mod error;
pub mod link;

pub use codec::{DecodeOutcome, ShareCodec, decode, encode};
pub use error::ShareError;
pub use link::ShareLink;
