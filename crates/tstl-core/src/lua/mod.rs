pub mod ast;
pub mod printer;

pub use ast::*;
pub use printer::LuaPrinter;
