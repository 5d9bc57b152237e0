use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{BinaryOp, Node};
use crate::lexer::Lexer;
use crate::value::{Closure, Value};

use super::environment::Environment;
use super::modules::Module;
use super::parser::Parser;

/// Name bound to the zero-based iteration index inside a loop body.
pub const STEP_VARIABLE: &str = "step";

/// The tree-walking runtime: variable scopes, the global function table,
/// the capability module registry, and the print callback. Evaluation is
/// re-entrant (function bodies call back into `eval`) and never fails;
/// anything unresolved produces `Void`.
pub struct Runtime {
    env: Environment,
    functions: HashMap<String, Rc<Closure>>,
    modules: HashMap<String, Rc<dyn Module>>,
    print: Box<dyn FnMut(&str)>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_print(Box::new(|text| println!("{}", text)))
    }

    /// Build a runtime with a custom output sink.
    pub fn with_print(print: Box<dyn FnMut(&str)>) -> Self {
        Self {
            env: Environment::new(),
            functions: HashMap::new(),
            modules: HashMap::new(),
            print,
        }
    }

    /// Make a capability module reachable from `call` statements. The
    /// runtime registers nothing on its own.
    pub fn register_module(&mut self, module: Rc<dyn Module>) {
        self.modules.insert(module.name().to_string(), module);
    }

    /// Tokenize, parse and evaluate a whole program, returning the value
    /// of its last top-level statement. Globals, functions and modules
    /// survive across calls, so a runtime can execute many sources.
    pub fn execute(&mut self, source: &str) -> Value {
        let tokens = Lexer::new(source).tokenize();
        let program = Parser::new(tokens).parse();
        self.eval(&program)
    }

    pub fn eval(&mut self, node: &Node) -> Value {
        match node {
            Node::Program(children) => {
                let mut result = Value::Void;
                for child in children {
                    result = self.eval(child);
                }
                result
            }

            Node::Block(children) => {
                self.env.push_scope();
                let mut result = Value::Void;
                for child in children {
                    result = self.eval(child);
                }
                self.env.pop_scope();
                result
            }

            Node::Declaration { name, value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr),
                    None => Value::Void,
                };
                if let Some(name) = name {
                    self.env.set(name.clone(), value.clone());
                }
                value
            }

            Node::FunctionDef { name, params, body } => {
                let closure = Rc::new(Closure {
                    params: params.clone(),
                    body: Rc::clone(body),
                });
                if let Some(name) = name {
                    self.functions.insert(name.clone(), Rc::clone(&closure));
                }
                Value::Function(closure)
            }

            Node::Call {
                target,
                method,
                args,
            } => {
                let Some(target) = target else {
                    return Value::Void;
                };
                // Arguments are evaluated in the caller's scope.
                let arg_values: Vec<Value> = args.iter().map(|arg| self.eval(arg)).collect();

                if let Some(module) = self.modules.get(target).cloned() {
                    return module.invoke(method.as_deref().unwrap_or(""), &arg_values);
                }
                if let Some(closure) = self.functions.get(target).cloned() {
                    return self.call_closure(&closure, &arg_values);
                }
                Value::Void
            }

            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = match condition {
                    Some(expr) => self.eval(expr),
                    None => Value::Void,
                };
                let branch = if condition.to_bool() {
                    then_branch
                } else {
                    else_branch
                };
                match branch {
                    Some(block) => self.eval(block),
                    None => Value::Void,
                }
            }

            Node::Loop { count, body } => {
                let count = match count {
                    Some(expr) => self.eval(expr),
                    None => Value::Void,
                };
                let iterations = iteration_count(count.to_number());
                let mut result = Value::Void;
                for index in 0..iterations {
                    self.env.push_scope();
                    self.env
                        .set(STEP_VARIABLE.to_string(), Value::Number(index as f64));
                    result = match body {
                        Some(block) => self.eval(block),
                        None => Value::Void,
                    };
                    self.env.pop_scope();
                }
                result
            }

            Node::Return(value) => match value {
                Some(expr) => self.eval(expr),
                None => Value::Void,
            },

            Node::Output {
                repeat,
                value,
                label,
            } => {
                let value = match value {
                    Some(expr) => self.eval(expr),
                    None => Value::Void,
                };
                let times = match repeat {
                    Some(expr) => iteration_count(self.eval(expr).to_number()),
                    None => 1,
                };
                let text = value.to_display();
                for _ in 0..times {
                    (self.print)(&text);
                }
                if let Some(label) = label {
                    self.env.set(label.clone(), value.clone());
                }
                value
            }

            Node::Assign { value, target } => {
                let value = match value {
                    Some(expr) => self.eval(expr),
                    None => Value::Void,
                };
                if let Some(target) = target {
                    // Overwrite the nearest existing binding; fall back to
                    // creating one in the current scope.
                    if !self.env.update(target, value.clone()) {
                        self.env.set(target.clone(), value.clone());
                    }
                }
                value
            }

            Node::Binary { op, left, right } => {
                let left = self.eval(left);
                let right = self.eval(right);
                eval_binary(*op, &left, &right)
            }

            Node::Identifier(name) => self.env.get(name).unwrap_or(Value::Void),

            Node::Literal(value) => value.clone(),
        }
    }

    fn call_closure(&mut self, closure: &Closure, args: &[Value]) -> Value {
        self.env.push_scope();
        // Positional binding: extra arguments are ignored, missing
        // parameters stay unbound and read back as Void.
        for (param, value) in closure.params.iter().zip(args.iter()) {
            self.env.set(param.to_string(), value.clone());
        }
        let result = self.eval(&closure.body);
        self.env.pop_scope();
        result
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn iteration_count(n: f64) -> u64 {
    if n.is_finite() && n >= 1.0 {
        n.floor() as u64
    } else {
        0
    }
}

fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => Value::Number(left.to_number() + right.to_number()),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => {
            let divisor = right.to_number();
            if divisor == 0.0 {
                Value::Number(0.0)
            } else {
                Value::Number(left.to_number() / divisor)
            }
        }
        BinaryOp::Greater => Value::Bool(left.to_number() > right.to_number()),
        BinaryOp::Less => Value::Bool(left.to_number() < right.to_number()),
        BinaryOp::Eq => Value::Bool(left.loosely_equals(right)),
        BinaryOp::NotEq => Value::Bool(!left.loosely_equals(right)),
        BinaryOp::And => Value::Bool(left.to_bool() && right.to_bool()),
        BinaryOp::Or => Value::Bool(left.to_bool() || right.to_bool()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn capturing_runtime() -> (Runtime, Rc<RefCell<Vec<String>>>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let runtime = Runtime::with_print(Box::new(move |text| {
            sink.borrow_mut().push(text.to_string());
        }));
        (runtime, lines)
    }

    #[test]
    fn test_say_prints_one_line() {
        let (mut runtime, lines) = capturing_runtime();
        let result = runtime.execute(r#"say "Hello""#);
        assert_eq!(lines.borrow().as_slice(), ["Hello"]);
        assert_eq!(result, Value::text("Hello"));
    }

    #[test]
    fn test_declared_arithmetic_prints_decimal() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute("form x from 3 plus 4 say x");
        assert_eq!(lines.borrow().as_slice(), ["7"]);
    }

    #[test]
    fn test_conditional_takes_then_branch() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute(r#"if 1 over 0 do say "yes" end else do say "no" end"#);
        assert_eq!(lines.borrow().as_slice(), ["yes"]);
    }

    #[test]
    fn test_conditional_takes_else_branch() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute(r#"if 0 over 1 do say "yes" end else do say "no" end"#);
        assert_eq!(lines.borrow().as_slice(), ["no"]);
    }

    #[test]
    fn test_loop_binds_step() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute("loop 3 do say step end");
        assert_eq!(lines.borrow().as_slice(), ["0", "1", "2"]);
    }

    #[test]
    fn test_division_by_zero_prints_zero() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute("say 10 div 0");
        assert_eq!(lines.borrow().as_slice(), ["0"]);
    }

    #[test]
    fn test_declaration_round_trip() {
        let mut runtime = Runtime::new();
        runtime.execute("declare x from 5");
        assert_eq!(runtime.execute("x"), Value::Number(5.0));
    }

    #[test]
    fn test_last_statement_value_is_returned() {
        let mut runtime = Runtime::new();
        assert_eq!(runtime.execute("1 plus 1 2 plus 2"), Value::Number(4.0));
    }

    #[test]
    fn test_loop_count_evaluated_once_with_floor() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute("loop 2.9 do say step end");
        assert_eq!(lines.borrow().len(), 2);
    }

    #[test]
    fn test_zero_and_negative_counts_skip_the_body() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute(r#"loop 0 do say "a" end loop 0 minus 3 do say "b" end"#);
        assert!(lines.borrow().is_empty());
    }

    #[test]
    fn test_undefined_lookup_is_void() {
        let mut runtime = Runtime::new();
        assert_eq!(runtime.execute("mystery"), Value::Void);
        assert_eq!(runtime.execute("call nothing 1 2"), Value::Void);
    }

    #[test]
    fn test_function_definition_returns_the_closure() {
        let mut runtime = Runtime::new();
        let result = runtime.execute("act twice n do give n times 2 end");
        assert!(matches!(result, Value::Function(_)));
        assert_eq!(runtime.execute("call twice 21"), Value::Number(42.0));
    }

    #[test]
    fn test_repeat_count_output() {
        let (mut runtime, lines) = capturing_runtime();
        runtime.execute(r#"say 3 "ho""#);
        assert_eq!(lines.borrow().as_slice(), ["ho", "ho", "ho"]);
    }

    #[test]
    fn test_output_label_stores_value() {
        let (mut runtime, _) = capturing_runtime();
        runtime.execute(r#"say 42 name "answer""#);
        assert_eq!(runtime.execute("answer"), Value::Number(42.0));
    }
}
