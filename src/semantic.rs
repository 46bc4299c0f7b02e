use thiserror::Error;

use crate::ast::{Expression, FunctionDecl, Program, Statement};
use crate::diagnostics::Reporter;
use crate::symbols::{Symbol, SymbolTable};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Undefined variable '{name}' on line {line}")]
    UndefinedName { name: String, line: usize },
    #[error("'{name}' is already defined in this scope (line {line})")]
    DuplicateDefinition { name: String, line: usize },
    #[error("Cannot assign to const '{name}' on line {line}")]
    AssignToConst { name: String, line: usize },
}

/// Scope-consistency pass over the parsed tree.
///
/// Walks every declaration with a scope stack, reporting undeclared names,
/// duplicate definitions within one scope, and assignments to const symbols
/// (functions and classes). The pass never stops early and never mutates
/// the tree.
pub struct SemanticAnalyzer<'r> {
    scopes: SymbolTable,
    reporter: &'r mut Reporter,
}

impl<'r> SemanticAnalyzer<'r> {
    pub fn new(reporter: &'r mut Reporter) -> Self {
        Self {
            scopes: SymbolTable::new(),
            reporter,
        }
    }

    pub fn analyze(&mut self, program: &Program) {
        for declaration in &program.declarations {
            self.check_statement(declaration);
        }
    }

    fn check_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expr(expr) | Statement::Print(expr) => self.check_expression(expr),
            Statement::Var {
                name,
                line,
                initializer,
            } => {
                if let Some(initializer) = initializer {
                    self.check_expression(initializer);
                }
                if !self.scopes.define(Symbol::variable(name.clone())) {
                    self.reporter.report(SemanticError::DuplicateDefinition {
                        name: name.clone(),
                        line: *line,
                    });
                }
            }
            Statement::Block(statements) => {
                self.scopes.push_scope();
                for statement in statements {
                    self.check_statement(statement);
                }
                self.scopes.pop_scope();
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_expression(condition);
                self.check_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_statement(else_branch);
                }
            }
            Statement::While { condition, body } => {
                self.check_expression(condition);
                self.check_statement(body);
            }
            Statement::Function(decl) => self.check_function(decl),
            Statement::Class {
                name,
                line,
                methods,
            } => {
                if !self.scopes.define(Symbol::class(name.clone())) {
                    self.reporter.report(SemanticError::DuplicateDefinition {
                        name: name.clone(),
                        line: *line,
                    });
                }

                // Methods live in their own scope rooted at the class.
                self.scopes.push_scope();
                for method in methods {
                    self.check_function(method);
                }
                self.scopes.pop_scope();
            }
        }
    }

    fn check_function(&mut self, decl: &FunctionDecl) {
        if !self.scopes.define(Symbol::function(decl.name.clone())) {
            self.reporter.report(SemanticError::DuplicateDefinition {
                name: decl.name.clone(),
                line: decl.line,
            });
        }

        self.scopes.push_scope();
        for param in &decl.params {
            if !self.scopes.define(Symbol::variable(param.clone())) {
                self.reporter.report(SemanticError::DuplicateDefinition {
                    name: param.clone(),
                    line: decl.line,
                });
            }
        }
        for statement in &decl.body {
            self.check_statement(statement);
        }
        self.scopes.pop_scope();
    }

    fn check_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Number(_) | Expression::Str(_) => {}
            Expression::Variable { name, line } => {
                if self.scopes.resolve(name).is_none() {
                    self.reporter.report(SemanticError::UndefinedName {
                        name: name.clone(),
                        line: *line,
                    });
                }
            }
            Expression::Assign { name, line, value } => {
                self.check_expression(value);
                match self.scopes.resolve(name) {
                    None => self.reporter.report(SemanticError::UndefinedName {
                        name: name.clone(),
                        line: *line,
                    }),
                    Some(symbol) if symbol.is_const => {
                        self.reporter.report(SemanticError::AssignToConst {
                            name: name.clone(),
                            line: *line,
                        });
                    }
                    Some(_) => {}
                }
            }
            Expression::Binary { left, right, .. } => {
                self.check_expression(left);
                self.check_expression(right);
            }
            Expression::Call { callee, args, .. } => {
                self.check_expression(callee);
                for arg in args {
                    self.check_expression(arg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use indoc::indoc;

    fn analyze_source(source: &str) -> Vec<String> {
        let mut reporter = Reporter::new();
        let program = Parser::new(Lexer::new(source), &mut reporter).parse_program();
        assert!(
            !reporter.had_errors(),
            "test source must parse cleanly: {:?}",
            reporter.messages()
        );
        SemanticAnalyzer::new(&mut reporter).analyze(&program);
        reporter.into_messages()
    }

    #[test]
    fn accepts_shadowing_in_nested_scope() {
        let messages = analyze_source(indoc! {"
            let x = 1;
            {
                let x = 2;
                print x;
            }
            print x;
        "});
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn reports_duplicate_in_same_scope() {
        let messages = analyze_source("let x = 1; let x = 2;");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'x' is already defined"));
    }

    #[test]
    fn reports_undefined_variable_read() {
        let messages = analyze_source("print missing;");
        assert_eq!(
            messages,
            ["Error: Undefined variable 'missing' on line 1"]
        );
    }

    #[test]
    fn reports_assignment_to_undeclared_name() {
        let messages = analyze_source("x = 1;");
        assert_eq!(messages, ["Error: Undefined variable 'x' on line 1"]);
    }

    #[test]
    fn reports_assignment_to_function_and_class() {
        let messages = analyze_source(indoc! {"
            fn f() { print 1; }
            class C { }
            f = 2;
            C = 3;
        "});
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("Cannot assign to const 'f'"));
        assert!(messages[1].contains("Cannot assign to const 'C'"));
    }

    #[test]
    fn function_parameters_live_in_their_own_scope() {
        let messages = analyze_source(indoc! {"
            let a = 1;
            fn f(a, b) {
                print a + b;
            }
            print a;
        "});
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn function_body_sees_enclosing_names() {
        let messages = analyze_source(indoc! {"
            let x = 10;
            fn show() {
                print x;
            }
        "});
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn reports_duplicate_parameter() {
        let messages = analyze_source("fn f(a, a) { print a; }");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'a' is already defined"));
    }

    #[test]
    fn method_names_do_not_leak_out_of_the_class() {
        let messages = analyze_source(indoc! {"
            class C {
                fn helper() { print 1; }
            }
            helper();
        "});
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Undefined variable 'helper'"));
    }

    #[test]
    fn completes_the_walk_after_reporting() {
        let messages = analyze_source(indoc! {"
            print first_missing;
            print second_missing;
        "});
        assert_eq!(messages.len(), 2);
    }
}
