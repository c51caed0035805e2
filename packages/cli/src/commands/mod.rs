pub mod autofix;
pub mod check;
pub mod init;
pub mod normalize;
pub mod schema;

pub use autofix::{autofix, AutofixArgs};
pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use schema::{schema, SchemaArgs};
