mod probe;
pub use probe::*;

mod reconcile;
pub use reconcile::*;

mod command;
pub use command::*;
