use thiserror::Error;

/// Errors raised while evaluating the tree. Each one unwinds the evaluator
/// back to its caller; diagnostics carry the source line where known.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}' on line {line}")]
    UndefinedVariable { name: String, line: usize },
    #[error("Operands of '+' must be two numbers or two strings on line {line}")]
    MismatchedAddition { line: usize },
    #[error("Operands of '{operator}' must be numbers on line {line}")]
    NonNumericOperands {
        operator: &'static str,
        line: usize,
    },
    #[error("Division by zero on line {line}")]
    DivisionByZero { line: usize },
    #[error("Expected {expected} arguments but got {found} on line {line}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },
    #[error("Value of type {type_name} is not callable on line {line}")]
    NotCallable {
        type_name: &'static str,
        line: usize,
    },
    #[error("Class '{name}' was instantiated after its defining scope ended (line {line})")]
    StaleClassScope { name: String, line: usize },
}
