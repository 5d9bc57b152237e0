//! Synonym tables: many surface spellings, one canonical meaning.
//!
//! Every lookup here is a static `match` so the parser and lexer share a
//! single source of truth for the vocabulary.

use crate::ast::BinaryOp;

/// Canonical statement production a keyword family maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtFamily {
    Declaration,
    Function,
    Call,
    Conditional,
    Loop,
    Return,
    Output,
    Assign,
}

pub fn statement_family(word: &str) -> Option<StmtFamily> {
    let family = match word {
        "form" | "let" | "var" | "const" | "set" | "create" | "make" | "declare" | "define"
        | "init" | "new" => StmtFamily::Declaration,
        "act" | "def" | "fn" | "func" | "function" | "method" | "procedure" => {
            StmtFamily::Function
        }
        "call" => StmtFamily::Call,
        "if" | "when" | "whenever" | "provided" | "assuming" | "given" => StmtFamily::Conditional,
        "loop" | "while" | "for" | "repeat" | "each" | "foreach" | "iterate" => StmtFamily::Loop,
        "give" | "return" | "yield" | "send" => StmtFamily::Return,
        "say" | "print" | "output" | "display" | "log" | "echo" | "show" | "write" => {
            StmtFamily::Output
        }
        "put" | "assign" | "update" => StmtFamily::Assign,
        _ => return None,
    };
    Some(family)
}

/// Binary operator precedence table. Only these spellings participate in
/// the expression grammar; higher binds tighter.
pub fn binary_operator(word: &str) -> Option<(u8, BinaryOp)> {
    let entry = match word {
        "or" => (1, BinaryOp::Or),
        "and" => (2, BinaryOp::And),
        "same" => (3, BinaryOp::Eq),
        "not" => (3, BinaryOp::NotEq),
        "over" => (4, BinaryOp::Greater),
        "under" => (4, BinaryOp::Less),
        "plus" => (5, BinaryOp::Add),
        "minus" => (5, BinaryOp::Sub),
        "times" => (6, BinaryOp::Mul),
        "div" => (6, BinaryOp::Div),
        _ => return None,
    };
    Some(entry)
}

pub fn is_block_start(word: &str) -> bool {
    matches!(word, "do" | "then" | "begin")
}

pub fn is_block_end(word: &str) -> bool {
    matches!(word, "end" | "finish" | "done")
}

pub fn is_else(word: &str) -> bool {
    matches!(word, "else" | "otherwise")
}

/// Introduces the value part of a declaration: `let x from 5`.
pub fn is_assign_intro(word: &str) -> bool {
    matches!(word, "from" | "is" | "equals" | "to" | "as" | "becomes")
}

/// Keywords that introduce a trailing clause and therefore terminate an
/// argument list.
pub fn is_clause_introducer(word: &str) -> bool {
    matches!(
        word,
        "with" | "to" | "on" | "from" | "as" | "is" | "becomes" | "equals" | "name"
    )
}

pub fn is_type_name(word: &str) -> bool {
    matches!(word, "num" | "text" | "list" | "map" | "bool" | "void")
}

/// Markup element names that desugar to an implicit `view` call.
pub fn is_element_name(word: &str) -> bool {
    matches!(
        word,
        "button" | "btn" | "input" | "field" | "image" | "img" | "label" | "pane" | "div"
            | "box" | "ul"
    )
}

/// Capability module names the parser may target without a literal `call`.
pub fn is_module_name(word: &str) -> bool {
    matches!(word, "net" | "file" | "vm" | "serve" | "view" | "play")
}

/// The full fixed vocabulary the tokenizer classifies as `Keyword`.
pub fn is_keyword(word: &str) -> bool {
    statement_family(word).is_some()
        || binary_operator(word).is_some()
        || is_block_start(word)
        || is_block_end(word)
        || is_else(word)
        || is_assign_intro(word)
        || is_type_name(word)
        || is_element_name(word)
        || is_module_name(word)
        || matches!(
            word,
            "true" | "false" | "with" | "on" | "name" | "read" | "start" | "route" | "post"
                | "delete" | "del" | "static" | "files" | "json" | "css" | "render" | "style"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_family() {
        for word in ["form", "let", "var", "const", "declare", "new"] {
            assert_eq!(statement_family(word), Some(StmtFamily::Declaration));
        }
    }

    #[test]
    fn test_operator_precedence_ordering() {
        let (or_prec, _) = binary_operator("or").unwrap();
        let (and_prec, _) = binary_operator("and").unwrap();
        let (plus_prec, _) = binary_operator("plus").unwrap();
        let (times_prec, _) = binary_operator("times").unwrap();
        assert!(or_prec < and_prec);
        assert!(and_prec < plus_prec);
        assert!(plus_prec < times_prec);
    }

    #[test]
    fn test_unwired_aliases_are_not_operators() {
        assert!(binary_operator("add").is_none());
        assert!(binary_operator("greater").is_none());
        assert!(binary_operator("equals").is_none());
    }

    #[test]
    fn test_vocabulary_membership() {
        assert!(is_keyword("say"));
        assert!(is_keyword("otherwise"));
        assert!(is_keyword("button"));
        assert!(is_keyword("serve"));
        assert!(is_keyword("true"));
        assert!(!is_keyword("twelve"));
        assert!(!is_keyword("hello"));
    }
}
