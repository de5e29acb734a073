mod generate;
mod list;

pub use generate::{GenerateArgs, cmd_generate};
pub use list::cmd_list;
