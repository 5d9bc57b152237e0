#![allow(dead_code)]

use lilt::{Runtime, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Runtime whose output lines are captured for assertions.
pub fn capturing_runtime() -> (Runtime, Rc<RefCell<Vec<String>>>) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lines);
    let runtime = Runtime::with_print(Box::new(move |text| {
        sink.borrow_mut().push(text.to_string());
    }));
    (runtime, lines)
}

/// Run a program in a fresh runtime and return its final value.
pub fn run(source: &str) -> Value {
    let (mut runtime, _) = capturing_runtime();
    runtime.execute(source)
}

/// Run a program in a fresh runtime and return everything it printed.
pub fn run_lines(source: &str) -> Vec<String> {
    let (mut runtime, lines) = capturing_runtime();
    runtime.execute(source);
    let collected = lines.borrow().clone();
    collected
}
