mod oracle;
pub use oracle::{Answer, NoOracle, Oracle, OracleUnavailable, ReferenceOracle};

pub(crate) mod questions;
pub use questions::{Question, QuestionConfig, QuestionGenerator};
