pub mod clock;
pub mod integrity;
pub mod traits;

#[cfg(feature = "memory-store")]
pub mod memory;

#[cfg(feature = "merkle")]
pub mod merkle;

pub use clock::*;
pub use integrity::*;
pub use traits::*;

#[cfg(feature = "memory-store")]
pub use memory::*;

#[cfg(feature = "merkle")]
pub use merkle::*;
