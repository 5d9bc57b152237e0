use lilt::cli::{generate_completions, AppConfig, Args, Commands};
use lilt::interpreter::default_modules;
use lilt::{Runtime, Value};

use clap::Parser;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::path::Path;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    verbose_log(&config, "Starting lilt");

    let mut runtime = Runtime::new();
    for module in default_modules() {
        runtime.register_module(module);
    }

    let source = if let Some(code) = &args.eval {
        verbose_log(&config, "Running code from command-line argument");
        code.clone()
    } else if let Some(path) = &args.script {
        verbose_log(&config, &format!("Reading script: {}", path.display()));
        match read_file(path) {
            Ok(source) => source,
            Err(e) => {
                error_message(&config, &e);
                std::process::exit(1);
            }
        }
    } else {
        run_repl(&mut runtime, &config);
        return;
    };

    let result = runtime.execute(&source);
    verbose_log(&config, "Program finished");

    if config.json {
        println!("{}", value_to_json(&result));
    } else if config.result {
        println!("{}", result.to_display());
    }
}

fn run_repl(runtime: &mut Runtime, config: &AppConfig) {
    if !config.verbose {
        println!("lilt interactive session");
        println!("Type statements and press Enter. Exit with Ctrl+D or 'exit'.");
        println!();
    } else {
        verbose_log(config, "Entering interactive mode");
    }

    loop {
        print!("lilt> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }

                // One persistent runtime: declarations and functions
                // survive from line to line.
                let result = runtime.execute(trimmed);
                if result != Value::Void {
                    println!("{}", result.to_display());
                }
            }
            Err(e) => {
                error_message(config, &format!("Error reading input: {}", e));
                break;
            }
        }
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn value_to_json(val: &Value) -> serde_json::Value {
    match val {
        Value::Void => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                serde_json::Value::from(*n as i64)
            } else {
                serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        Value::Text(s) => serde_json::Value::String(s.to_string()),
        Value::List(items) => {
            serde_json::Value::Array(items.borrow().iter().map(value_to_json).collect())
        }
        Value::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (key, value) in entries.borrow().iter() {
                object.insert(key.clone(), value_to_json(value));
            }
            serde_json::Value::Object(object)
        }
        Value::Function(_) => serde_json::Value::String("<function>".to_string()),
    }
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[lilt:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
