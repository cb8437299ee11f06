//! TCP transport for the EDI host link.
//!
//! This is the lowest layer of edilink. It resolves host addresses, opens
//! the TCP stream, and exposes the [`Transport`] trait the framing and
//! session layers are written against.

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::{connect, resolve};
pub use traits::{EdiStream, Transport};
