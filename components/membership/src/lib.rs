#[macro_use]
extern crate quick_error;

mod errors;
pub use errors::*;

mod member;
pub use member::*;

mod client;
pub use client::*;

mod etcd;
pub use etcd::*;

pub mod testutil;


#[cfg(test)]
mod test_etcd;
