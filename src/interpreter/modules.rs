//! The capability seam: everything side-effecting lives behind `Module`.
//!
//! The runtime registers none of these by itself; a deployment picks the
//! modules it wants before executing anything.

use indexmap::IndexMap;
use std::rc::Rc;

use crate::value::Value;

/// A named capability reachable from `call` statements. Implementations
/// must always return a value, never fail across this boundary, and must
/// not keep references to `args` beyond the call.
pub trait Module {
    fn name(&self) -> &str;
    fn invoke(&self, method: &str, args: &[Value]) -> Value;
}

/// The stock module set: network, filesystem, VM, server, view and game
/// capabilities. Everything except `file` answers with a descriptive
/// value rather than touching the outside world.
pub fn default_modules() -> Vec<Rc<dyn Module>> {
    vec![
        Rc::new(NetModule),
        Rc::new(FileModule),
        Rc::new(VmModule),
        Rc::new(ServeModule),
        Rc::new(ViewModule),
        Rc::new(PlayModule),
    ]
}

pub struct NetModule;

impl Module for NetModule {
    fn name(&self) -> &str {
        "net"
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        match method {
            "get" if !args.is_empty() => Value::text(format!("GET {}", args[0].to_display())),
            "post" if args.len() >= 2 => {
                Value::text(format!("POST {}", args[0].to_display()))
            }
            _ => Value::Void,
        }
    }
}

pub struct FileModule;

impl Module for FileModule {
    fn name(&self) -> &str {
        "file"
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        match method {
            "read" if !args.is_empty() => {
                let path = args[0].to_display();
                match std::fs::read_to_string(&path) {
                    Ok(content) => Value::text(content),
                    Err(_) => Value::Bool(false),
                }
            }
            "write" if args.len() >= 2 => {
                let path = args[0].to_display();
                let data = args[1].to_display();
                Value::Bool(std::fs::write(&path, data).is_ok())
            }
            _ => Value::Bool(false),
        }
    }
}

pub struct VmModule;

impl Module for VmModule {
    fn name(&self) -> &str {
        "vm"
    }

    fn invoke(&self, method: &str, _args: &[Value]) -> Value {
        match method {
            "make" => Value::text("VM created"),
            _ => Value::Void,
        }
    }
}

pub struct ServeModule;

impl Module for ServeModule {
    fn name(&self) -> &str {
        "serve"
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        match method {
            "on" | "start" if !args.is_empty() => {
                let port = args[0].to_number() as i64;
                Value::text(format!("Server on port {}", port))
            }
            "get" | "route" if !args.is_empty() => {
                Value::text(format!("Route GET {}", args[0].to_display()))
            }
            "post" if !args.is_empty() => {
                Value::text(format!("Route POST {}", args[0].to_display()))
            }
            "put" if !args.is_empty() => {
                Value::text(format!("Route PUT {}", args[0].to_display()))
            }
            "delete" | "del" if !args.is_empty() => {
                Value::text(format!("Route DELETE {}", args[0].to_display()))
            }
            "static" | "files" if !args.is_empty() => {
                Value::text(format!("Serving static files from {}", args[0].to_display()))
            }
            "json" | "send" if !args.is_empty() => Value::text("JSON response"),
            _ => Value::Void,
        }
    }
}

pub struct ViewModule;

impl ViewModule {
    /// Alternating key/value arguments folded into a property map.
    fn props_from_pairs(args: &[Value]) -> IndexMap<String, Value> {
        let mut props = IndexMap::new();
        for pair in args.chunks(2) {
            if let [key, value] = pair {
                props.insert(key.to_display(), value.clone());
            }
        }
        props
    }
}

impl Module for ViewModule {
    fn name(&self) -> &str {
        "view"
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Value {
        match method {
            "pane" | "div" | "box" | "input" | "field" | "style" | "css" => {
                Value::map(Self::props_from_pairs(args))
            }
            "button" | "btn" => {
                let mut props = IndexMap::new();
                if let Some(text) = args.first() {
                    props.insert("text".to_string(), text.clone());
                }
                props.extend(Self::props_from_pairs(args.get(1..).unwrap_or(&[])));
                Value::map(props)
            }
            "text" | "label" if !args.is_empty() => {
                let mut props = IndexMap::new();
                props.insert("content".to_string(), args[0].clone());
                Value::map(props)
            }
            "image" | "img" if !args.is_empty() => {
                let mut props = IndexMap::new();
                props.insert("src".to_string(), args[0].clone());
                Value::map(props)
            }
            "list" | "ul" => {
                let mut props = IndexMap::new();
                if let Some(items @ Value::List(_)) = args.first() {
                    props.insert("items".to_string(), items.clone());
                }
                Value::map(props)
            }
            "show" | "render" if !args.is_empty() => {
                Value::text(format!("Rendered: {}", args[0].to_display()))
            }
            _ => Value::Void,
        }
    }
}

pub struct PlayModule;

impl Module for PlayModule {
    fn name(&self) -> &str {
        "play"
    }

    fn invoke(&self, method: &str, _args: &[Value]) -> Value {
        match method {
            "game" | "sprite" | "render" => Value::text(format!("Play: {}", method)),
            _ => Value::Void,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_stub_describes_request() {
        let net = NetModule;
        let result = net.invoke("get", &[Value::text("http://example.com")]);
        assert_eq!(result, Value::text("GET http://example.com"));
        assert_eq!(net.invoke("get", &[]), Value::Void);
    }

    #[test]
    fn test_serve_routes() {
        let serve = ServeModule;
        assert_eq!(
            serve.invoke("start", &[Value::Number(8080.0)]),
            Value::text("Server on port 8080")
        );
        assert_eq!(
            serve.invoke("del", &[Value::text("/users")]),
            Value::text("Route DELETE /users")
        );
    }

    #[test]
    fn test_view_button_props() {
        let view = ViewModule;
        let result = view.invoke(
            "button",
            &[
                Value::text("Click"),
                Value::text("color"),
                Value::text("red"),
            ],
        );
        match result {
            Value::Map(props) => {
                let props = props.borrow();
                assert_eq!(props.get("text"), Some(&Value::text("Click")));
                assert_eq!(props.get("color"), Some(&Value::text("red")));
            }
            other => panic!("expected a property map, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_methods_never_fail() {
        for module in default_modules() {
            let _ = module.invoke("definitely_not_a_method", &[Value::Void]);
        }
    }
}
