//! Tree-walking evaluator.
//!
//! Executes the parsed tree directly against a chain of environments.
//! Expression evaluation returns values; statements drive side effects.
//! Printed lines accumulate in the interpreter's output buffer so a caller
//! can flush them even when a runtime error cut the run short.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{BinaryOperator, Expression, Program, Statement};

pub mod env;
pub mod error;
pub mod value;

use env::{EnvRef, Environment};
pub use error::RuntimeError;
pub use value::Value;
use value::{ClassValue, FunctionValue, InstanceValue};

pub struct Interpreter {
    environment: EnvRef,
    output: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            environment: Rc::new(RefCell::new(Environment::new())),
            output: Vec::new(),
        }
    }

    /// Evaluates the whole program. The first runtime error unwinds every
    /// nested environment and aborts the run; output printed before the
    /// error stays available through [`Interpreter::output`].
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for declaration in &program.declarations {
            self.execute(declaration)?;
        }
        Ok(())
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    fn execute(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        match statement {
            Statement::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Statement::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.output.push(value.to_output());
                Ok(())
            }
            Statement::Var {
                name, initializer, ..
            } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name, value);
                Ok(())
            }
            Statement::Block(statements) => {
                let block_env = Rc::new(RefCell::new(Environment::with_enclosing(
                    self.environment.clone(),
                )));
                self.execute_block(statements, block_env)
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Statement::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
            Statement::Function(decl) => {
                let function = FunctionValue {
                    declaration: decl.clone(),
                    closure: self.environment.clone(),
                };
                self.environment
                    .borrow_mut()
                    .define(&decl.name, Value::Function(Rc::new(function)));
                Ok(())
            }
            Statement::Class { name, methods, .. } => {
                // Forward declaration: the name must exist before the methods
                // capture their closure, so `init` can resolve the class.
                self.environment.borrow_mut().define(name, Value::Nil);

                let methods = methods
                    .iter()
                    .map(|method| (method.name.clone(), method.clone()))
                    .collect();
                let class = ClassValue {
                    name: name.clone(),
                    methods,
                    closure: Rc::downgrade(&self.environment),
                };
                let assigned = self
                    .environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)));
                debug_assert!(assigned, "class name was defined just above");
                Ok(())
            }
        }
    }

    /// Runs `statements` inside `environment`, restoring the previous
    /// environment on every exit path.
    fn execute_block(
        &mut self,
        statements: &[Statement],
        environment: EnvRef,
    ) -> Result<(), RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        match expression {
            Expression::Number(value) => Ok(Value::Number(*value)),
            Expression::Str(value) => Ok(Value::Str(value.clone())),
            Expression::Variable { name, line } => self
                .environment
                .borrow()
                .get(name)
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: name.clone(),
                    line: *line,
                }),
            Expression::Assign { name, line, value } => {
                let value = self.evaluate(value)?;
                if self.environment.borrow_mut().assign(name, value.clone()) {
                    Ok(value)
                } else {
                    Err(RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        line: *line,
                    })
                }
            }
            Expression::Binary {
                left,
                op,
                line,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply_binary(left, *op, *line, right)
            }
            Expression::Call { callee, line, args } => {
                let callee = self.evaluate(callee)?;
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.evaluate(arg)?);
                }
                self.call_value(callee, evaluated, *line)
            }
        }
    }

    fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => self.call_function(&function, args, line),
            Value::Class(class) => self.instantiate(&class, args, line),
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name(),
                line,
            }),
        }
    }

    fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: function.arity(),
                found: args.len(),
                line,
            });
        }

        let mut call_env = Environment::with_enclosing(function.closure.clone());
        for (param, value) in function.declaration.params.iter().zip(args) {
            call_env.define(param, value);
        }
        self.execute_block(
            &function.declaration.body,
            Rc::new(RefCell::new(call_env)),
        )?;

        // Function bodies do not produce a value.
        Ok(Value::Nil)
    }

    fn instantiate(
        &mut self,
        class: &Rc<ClassValue>,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        if args.len() != class.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: class.arity(),
                found: args.len(),
                line,
            });
        }

        let instance = Rc::new(RefCell::new(InstanceValue::new(class.clone())));
        if let Some(init) = class.method("init") {
            let closure =
                class
                    .closure
                    .upgrade()
                    .ok_or_else(|| RuntimeError::StaleClassScope {
                        name: class.name.clone(),
                        line,
                    })?;
            let init = FunctionValue {
                declaration: init.clone(),
                closure,
            };
            // `init` runs for its side effects only.
            self.call_function(&init, args, line)?;
        }
        Ok(Value::Instance(instance))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_binary(
    left: Value,
    op: BinaryOperator,
    line: usize,
    right: Value,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOperator::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            _ => Err(RuntimeError::MismatchedAddition { line }),
        },
        BinaryOperator::Sub => {
            let (a, b) = number_operands(left, right, op, line)?;
            Ok(Value::Number(a - b))
        }
        BinaryOperator::Mul => {
            let (a, b) = number_operands(left, right, op, line)?;
            Ok(Value::Number(a * b))
        }
        BinaryOperator::Div => {
            let (a, b) = number_operands(left, right, op, line)?;
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            Ok(Value::Number(a / b))
        }
        BinaryOperator::Less => {
            let (a, b) = number_operands(left, right, op, line)?;
            Ok(Value::Boolean(a < b))
        }
        BinaryOperator::LessEqual => {
            let (a, b) = number_operands(left, right, op, line)?;
            Ok(Value::Boolean(a <= b))
        }
        BinaryOperator::Greater => {
            let (a, b) = number_operands(left, right, op, line)?;
            Ok(Value::Boolean(a > b))
        }
        BinaryOperator::GreaterEqual => {
            let (a, b) = number_operands(left, right, op, line)?;
            Ok(Value::Boolean(a >= b))
        }
        BinaryOperator::Equal => Ok(Value::Boolean(left.strictly_equals(&right))),
        BinaryOperator::NotEqual => Ok(Value::Boolean(!left.strictly_equals(&right))),
    }
}

fn number_operands(
    left: Value,
    right: Value,
    op: BinaryOperator,
    line: usize,
) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(RuntimeError::NonNumericOperands {
            operator: op.symbol(),
            line,
        }),
    }
}
