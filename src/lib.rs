#![doc(html_root_url = "https://docs.rs/bencode/0.1.0")]
#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

// Re-export the alloc crate for use by the arena and decoder.
#[doc(hidden)]
pub extern crate alloc;

// Re-export the bytes crate, whose `Buf` cursor drives the decoder.
pub use bytes;

pub mod arena;
mod builder;
mod decoder;
mod dict_index;
mod error;
mod node;
mod serializer;
mod validator;

pub use crate::arena::Arena;
pub use crate::builder::{dict_put, list_append, new_dictionary, new_integer, new_list};
pub use crate::builder::{new_string_borrowed, new_string_copied};
pub use crate::decoder::decode;
pub use crate::error::{DecodeError, ValidateError};
pub use crate::node::{Node, NodeKind};
pub use crate::serializer::to_flat_in_arena;
pub use crate::validator::validate;

#[cfg(feature = "std")]
pub use crate::serializer::{to_flat_vec, to_segments};

// Depth limit for both the decoder's recursive descent and the validator's.
// 100 mirrors the default nesting limit vospro/rtpengine's C implementation
// relied on implicitly through available stack; here it is explicit and
// checked rather than left to chance.
const RECURSION_LIMIT: u32 = 100;
