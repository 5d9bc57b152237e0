use std::rc::Rc;

use crate::ast::Node;
use crate::keywords::{self, StmtFamily};
use crate::token::{Token, TokenKind};
use crate::value::{number_from_text, Value};

/// Recursive-descent parser over the token list.
///
/// The grammar is total: every token stream produces some tree, and
/// recovery is "skip the unrecognized token and continue". Nothing in
/// here returns an error.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfInput) {
            let (line, col) = tokens
                .last()
                .map(|t| (t.line, t.col))
                .unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::EndOfInput, "", line, col));
        }
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Node {
        let mut statements = Vec::new();
        while !self.at_end() {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
        }
        Node::Program(statements)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self, ahead: usize) -> &Token {
        &self.tokens[(self.pos + ahead).min(self.tokens.len() - 1)]
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::EndOfInput
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    fn current_keyword(&self) -> Option<&str> {
        match self.current().kind {
            TokenKind::Keyword => Some(self.current().lexeme.as_str()),
            _ => None,
        }
    }

    /// A token that ends the current clause: end of input, a block
    /// delimiter, or the start of another statement.
    fn at_statement_boundary(&self) -> bool {
        if self.at_end() {
            return true;
        }
        self.current_keyword().is_some_and(|word| {
            keywords::is_block_end(word)
                || keywords::is_else(word)
                || keywords::is_block_start(word)
                || keywords::statement_family(word).is_some()
        })
    }

    fn at_block_boundary(&self) -> bool {
        self.current_keyword().is_some_and(|word| {
            keywords::is_block_end(word)
                || keywords::is_else(word)
                || keywords::is_block_start(word)
        })
    }

    fn starts_value(&self, token: &Token) -> bool {
        matches!(
            token.kind,
            TokenKind::Number | TokenKind::String | TokenKind::Identifier
        )
    }

    fn parse_statement(&mut self) -> Option<Rc<Node>> {
        match self.current().kind {
            TokenKind::Keyword => {
                let word = self.current().lexeme.clone();
                if let Some(family) = keywords::statement_family(&word) {
                    return Some(match family {
                        StmtFamily::Declaration => self.parse_declaration(),
                        StmtFamily::Function => self.parse_function(),
                        StmtFamily::Call => self.parse_call(),
                        StmtFamily::Conditional => self.parse_conditional(),
                        StmtFamily::Loop => self.parse_loop(),
                        StmtFamily::Return => self.parse_return(),
                        StmtFamily::Output => self.parse_output(),
                        StmtFamily::Assign => self.parse_assign(),
                    });
                }
                if keywords::binary_operator(&word).is_some() || word == "true" || word == "false"
                {
                    return self.parse_expression();
                }
                if keywords::is_element_name(&word) {
                    return Some(self.parse_implicit_element());
                }
                if keywords::is_module_name(&word) {
                    return Some(self.parse_implicit_module());
                }
                // A keyword with no statement meaning here is skipped.
                self.advance();
                None
            }
            TokenKind::Identifier | TokenKind::Number | TokenKind::String => {
                self.parse_expression()
            }
            TokenKind::Symbol => {
                self.advance();
                None
            }
            TokenKind::EndOfInput => None,
        }
    }

    fn parse_block(&mut self) -> Rc<Node> {
        let mut statements = Vec::new();
        loop {
            if self.at_end() {
                break;
            }
            if let Some(word) = self.current_keyword() {
                if keywords::is_block_end(word) {
                    self.advance();
                    break;
                }
                if keywords::is_else(word) {
                    // Left in place for the enclosing conditional.
                    break;
                }
            }
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
        }
        Rc::new(Node::Block(statements))
    }

    fn parse_declaration(&mut self) -> Rc<Node> {
        self.advance();

        let mut type_name = None;
        if let Some(word) = self.current_keyword() {
            if keywords::is_type_name(word) && self.peek(1).kind == TokenKind::Identifier {
                type_name = Some(self.advance().lexeme);
            }
        }

        let name =
            (self.current().kind == TokenKind::Identifier).then(|| self.advance().lexeme);

        let value = if self
            .current_keyword()
            .is_some_and(keywords::is_assign_intro)
        {
            self.advance();
            self.parse_expression()
        } else if !self.at_statement_boundary() {
            // No introducer, but something follows: read it as the value.
            self.parse_expression()
        } else {
            None
        };

        Rc::new(Node::Declaration {
            type_name,
            name,
            value,
        })
    }

    fn parse_function(&mut self) -> Rc<Node> {
        self.advance();

        let name =
            (self.current().kind == TokenKind::Identifier).then(|| self.advance().lexeme);

        let mut params: Vec<Rc<str>> = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::Identifier => {
                    let param = self.advance().lexeme;
                    params.push(Rc::from(param.as_str()));
                }
                TokenKind::Symbol if matches!(self.current().lexeme.as_str(), "," | ";") => {
                    self.advance();
                }
                _ => break,
            }
        }

        if self
            .current_keyword()
            .is_some_and(|word| keywords::is_block_start(word) || word == "when")
        {
            self.advance();
        }
        let body = self.parse_block();

        Rc::new(Node::FunctionDef { name, params, body })
    }

    fn parse_call(&mut self) -> Rc<Node> {
        self.advance();

        let target = if self.current().kind == TokenKind::Identifier
            || self.current_keyword().is_some_and(keywords::is_module_name)
        {
            Some(self.advance().lexeme)
        } else {
            None
        };

        let method = if target.as_deref().is_some_and(keywords::is_module_name) {
            self.parse_method_name()
        } else {
            None
        };

        let args = self.parse_call_args(false);
        Rc::new(Node::Call {
            target,
            method,
            args,
        })
    }

    fn parse_implicit_element(&mut self) -> Rc<Node> {
        let element = self.advance().lexeme;
        let args = self.parse_call_args(true);
        Rc::new(Node::Call {
            target: Some("view".to_string()),
            method: Some(element),
            args,
        })
    }

    fn parse_implicit_module(&mut self) -> Rc<Node> {
        let module = self.advance().lexeme;
        let method = self.parse_method_name();
        let args = self.parse_call_args(true);
        Rc::new(Node::Call {
            target: Some(module),
            method,
            args,
        })
    }

    fn parse_method_name(&mut self) -> Option<String> {
        match self.current().kind {
            TokenKind::Identifier => Some(self.advance().lexeme),
            TokenKind::Keyword if !self.at_block_boundary() => Some(self.advance().lexeme),
            _ => None,
        }
    }

    fn parse_call_args(&mut self, implicit: bool) -> Vec<Rc<Node>> {
        let mut args = Vec::new();
        loop {
            if self.at_end() || self.at_block_boundary() {
                break;
            }
            if let Some(word) = self.current_keyword() {
                if implicit {
                    // Implicit statements give up their arguments as soon
                    // as another clause or statement could begin.
                    if keywords::is_clause_introducer(word)
                        || keywords::statement_family(word).is_some()
                    {
                        break;
                    }
                } else {
                    let introduces_clause =
                        keywords::is_clause_introducer(word) || matches!(word, "put" | "give");
                    // A clause introducer followed by a plain value still
                    // reads as part of the argument expression.
                    if introduces_clause && !self.starts_value(self.peek(1)) {
                        break;
                    }
                }
            }
            match self.parse_expression() {
                Some(expr) => args.push(expr),
                None => break,
            }
        }
        args
    }

    fn parse_conditional(&mut self) -> Rc<Node> {
        self.advance();

        let condition = self.parse_expression();

        let then_branch = if self.current_keyword().is_some_and(keywords::is_block_start) {
            self.advance();
            Some(self.parse_block())
        } else {
            None
        };

        let else_branch = if self.current_keyword().is_some_and(keywords::is_else) {
            self.advance();
            if self.current_keyword().is_some_and(keywords::is_block_start) {
                self.advance();
                Some(self.parse_block())
            } else {
                None
            }
        } else {
            None
        };

        Rc::new(Node::Conditional {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_loop(&mut self) -> Rc<Node> {
        self.advance();

        let count = self.parse_expression();
        let body = if self.current_keyword().is_some_and(keywords::is_block_start) {
            self.advance();
            Some(self.parse_block())
        } else {
            None
        };

        Rc::new(Node::Loop { count, body })
    }

    fn parse_return(&mut self) -> Rc<Node> {
        self.advance();
        let value = if self.at_statement_boundary() {
            None
        } else {
            self.parse_expression()
        };
        Rc::new(Node::Return(value))
    }

    fn parse_output(&mut self) -> Rc<Node> {
        self.advance();

        // A leading number is a repeat count only when a printable
        // expression follows it; `say 2 plus 3` stays one expression.
        let repeat = if self.current().kind == TokenKind::Number
            && self.starts_value(self.peek(1))
        {
            let token = self.advance();
            Some(Rc::new(Node::Literal(Value::Number(number_from_text(
                &token.lexeme,
            )))))
        } else {
            None
        };

        let value = if self.at_statement_boundary() {
            None
        } else {
            self.parse_expression()
        };

        let label = if self.current().is_keyword("name")
            && self.peek(1).kind == TokenKind::String
        {
            self.advance();
            Some(self.advance().lexeme)
        } else {
            None
        };

        Rc::new(Node::Output {
            repeat,
            value,
            label,
        })
    }

    fn parse_assign(&mut self) -> Rc<Node> {
        self.advance();

        let value = if self.at_statement_boundary() {
            None
        } else {
            self.parse_expression()
        };

        let target = if self.current().is_keyword("to") {
            self.advance();
            (self.current().kind == TokenKind::Identifier).then(|| self.advance().lexeme)
        } else if self.current().kind == TokenKind::Identifier {
            Some(self.advance().lexeme)
        } else {
            None
        };

        Rc::new(Node::Assign { value, target })
    }

    fn parse_expression(&mut self) -> Option<Rc<Node>> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<Rc<Node>> {
        let mut left = self.parse_primary()?;
        loop {
            let Some((prec, op)) = self
                .current_keyword()
                .and_then(keywords::binary_operator)
            else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            match self.parse_binary(prec + 1) {
                Some(right) => {
                    left = Rc::new(Node::Binary { op, left, right });
                }
                // Dangling operator at the end of input.
                None => break,
            }
        }
        Some(left)
    }

    fn parse_primary(&mut self) -> Option<Rc<Node>> {
        let node = match self.current().kind {
            TokenKind::Number => {
                let token = self.advance();
                Node::Literal(Value::Number(number_from_text(&token.lexeme)))
            }
            TokenKind::String => Node::Literal(Value::text(self.advance().lexeme)),
            TokenKind::Identifier => Node::Identifier(self.advance().lexeme),
            TokenKind::Keyword => {
                let token = self.advance();
                match token.lexeme.as_str() {
                    "true" => Node::Literal(Value::Bool(true)),
                    "false" => Node::Literal(Value::Bool(false)),
                    // Any other keyword in expression position reads as a name.
                    _ => Node::Identifier(token.lexeme),
                }
            }
            TokenKind::Symbol | TokenKind::EndOfInput => return None,
        };
        Some(Rc::new(node))
    }
}
