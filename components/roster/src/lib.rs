#[macro_use]
extern crate quick_error;

mod errors;
pub use errors::*;

mod provider;
pub use provider::*;

mod file;
pub use file::*;

mod metadata;
pub use metadata::*;

#[cfg(test)]
mod test_provider;
