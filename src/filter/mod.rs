pub mod evaluate;
pub mod predicate;
pub mod record;

pub use evaluate::evaluate_rows;
pub use predicate::{
    compile_filter, CompiledFilter, FilterCompileError, FilterSpec, PredicateError, RowPredicate,
};
pub use record::Record;
