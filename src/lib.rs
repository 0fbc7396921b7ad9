pub mod ast;
pub mod config;
pub mod data_type;
pub mod database;
pub mod error;
pub mod filter;
pub mod key;
pub mod parser;
pub mod persistence;
pub mod session;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use config::Config;
pub use data_type::DataType;
pub use database::{Database, QueryResult};
pub use error::{Error, Result};
pub use key::{Key, KeyType};
pub use session::{Output, Session};
pub use table::{ColumnDef, Schema, Table};
pub use value::Value;
