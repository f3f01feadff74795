mod envfile;
pub use envfile::*;

mod errors;
pub use errors::*;

#[cfg(test)]
mod test_envfile;
