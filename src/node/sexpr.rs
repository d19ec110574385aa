//! S-expression (de)serialization (spec.md §4.4): a small token-by-token
//! grammar, round-trip exact on canonical nodes.
//!
//! Grammar (one node per form):
//! ```text
//! node    := "NIL" | "(" "ENTITY" atom ")" | "(" "VAR" atom ")"
//!          | "(" "REL" atom node* ")" | "(" "OP" atom node* ")"
//!          | "(" "STRUCT" field* ")" | "(" "LIST" node* ")"
//!          | "(" "TEXT" atom ")" | "(" "NUMBER" atom ")" | "(" "BOOL" atom ")"
//! field   := "(" atom node ")"
//! atom    := quoted-string | bareword
//! ```

use super::error::NodeError;
use super::{arena, Node, NodeRef};

pub fn to_sexpr(n: &NodeRef) -> String {
    match n.as_ref() {
        Node::Entity { label } => format!("(ENTITY {})", quote(label)),
        Node::Var { label } => format!("(VAR {})", quote(label)),
        Node::Rel { label, args } => format!("(REL {} {})", quote(label), join_nodes(args)),
        Node::Op { label, args } => format!("(OP {} {})", quote(label), join_nodes(args)),
        Node::Struct { fields } => {
            let body = fields
                .iter()
                .map(|(k, v)| format!("({} {})", quote(k), to_sexpr(v)))
                .collect::<Vec<_>>()
                .join(" ");
            format!("(STRUCT {body})")
        }
        Node::List { items } => format!("(LIST {})", join_nodes(items)),
        Node::Text(s) => format!("(TEXT {})", quote(s)),
        Node::Number(v) => format!("(NUMBER {v:?})"),
        Node::Bool(b) => format!("(BOOL {b})"),
        Node::Nil => "NIL".to_string(),
    }
}

fn join_nodes(nodes: &[NodeRef]) -> String {
    nodes.iter().map(to_sexpr).collect::<Vec<_>>().join(" ")
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Atom(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, NodeError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        None => return Err(NodeError::ParseError("unterminated string".to_string())),
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => s.push('"'),
                            Some('\\') => s.push('\\'),
                            Some(other) => s.push(other),
                            None => return Err(NodeError::ParseError("unterminated escape".to_string())),
                        },
                        Some(c) => s.push(c),
                    }
                }
                tokens.push(Token::Atom(s));
            }
            _ => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                tokens.push(Token::Atom(s));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, NodeError> {
        let t = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| NodeError::ParseError("unexpected end of input".to_string()))?;
        self.pos += 1;
        Ok(t)
    }

    fn expect_lparen(&mut self) -> Result<(), NodeError> {
        match self.next()? {
            Token::LParen => Ok(()),
            other => Err(NodeError::ParseError(format!("expected '(', got {other:?}"))),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), NodeError> {
        match self.next()? {
            Token::RParen => Ok(()),
            other => Err(NodeError::ParseError(format!("expected ')', got {other:?}"))),
        }
    }

    fn expect_atom(&mut self) -> Result<String, NodeError> {
        match self.next()? {
            Token::Atom(s) => Ok(s),
            other => Err(NodeError::ParseError(format!("expected atom, got {other:?}"))),
        }
    }

    fn at_rparen(&self) -> bool {
        matches!(self.peek(), Some(Token::RParen))
    }

    fn parse_node(&mut self) -> Result<NodeRef, NodeError> {
        if let Some(Token::Atom(a)) = self.peek() {
            if a == "NIL" {
                self.pos += 1;
                return Ok(arena::canonical(Node::Nil));
            }
        }
        self.expect_lparen()?;
        let tag = self.expect_atom()?;
        let node = match tag.as_str() {
            "ENTITY" => super::entity(&self.expect_atom()?)?,
            "VAR" => super::var(&self.expect_atom()?)?,
            "REL" => {
                let label = self.expect_atom()?;
                let mut args = Vec::new();
                while !self.at_rparen() {
                    args.push(self.parse_node()?);
                }
                super::relation(&label, args)?
            }
            "OP" => {
                let label = self.expect_atom()?;
                let mut args = Vec::new();
                while !self.at_rparen() {
                    args.push(self.parse_node()?);
                }
                super::operation(&label, args)?
            }
            "STRUCT" => {
                let mut fields = Vec::new();
                while !self.at_rparen() {
                    self.expect_lparen()?;
                    let key = self.expect_atom()?;
                    let value = self.parse_node()?;
                    self.expect_rparen()?;
                    fields.push((key, value));
                }
                let refs: Vec<(&str, NodeRef)> = fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
                super::struct_(refs)?
            }
            "LIST" => {
                let mut items = Vec::new();
                while !self.at_rparen() {
                    items.push(self.parse_node()?);
                }
                super::list_node(items)
            }
            "TEXT" => super::text(self.expect_atom()?),
            "NUMBER" => {
                let raw = self.expect_atom()?;
                let v: f64 = raw
                    .parse()
                    .map_err(|_| NodeError::ParseError(format!("invalid number literal {raw:?}")))?;
                super::number(v)
            }
            "BOOL" => {
                let raw = self.expect_atom()?;
                let v = match raw.as_str() {
                    "true" => true,
                    "false" => false,
                    _ => return Err(NodeError::ParseError(format!("invalid bool literal {raw:?}"))),
                };
                super::boolean(v)
            }
            other => return Err(NodeError::ParseError(format!("unknown node tag {other:?}"))),
        };
        self.expect_rparen()?;
        Ok(node)
    }
}

/// Parses a single node from its S-expr textual form.
pub fn parse_sexpr(input: &str) -> Result<NodeRef, NodeError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_node()?;
    if parser.pos != parser.tokens.len() {
        return Err(NodeError::ParseError("trailing input after node".to_string()));
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::normalize::normalize;
    use crate::node::{entity, fingerprint::fingerprint, number, relation, struct_};

    #[test]
    fn round_trip_entity() {
        let n = entity("socrates").unwrap();
        let s = to_sexpr(&n);
        let back = parse_sexpr(&s).unwrap();
        assert_eq!(fingerprint(&n), fingerprint(&back));
    }

    #[test]
    fn round_trip_relation_and_struct() {
        let n = normalize(
            &super::super::struct_(vec![
                ("subject", entity("dog").unwrap()),
                (
                    "relations",
                    super::super::list_node(vec![relation(
                        "IS_A",
                        vec![entity("dog").unwrap(), entity("animal").unwrap()],
                    )
                    .unwrap()]),
                ),
                ("result", number(4.0)),
            ])
            .unwrap(),
        );
        let s = to_sexpr(&n);
        let back = parse_sexpr(&s).unwrap();
        assert_eq!(fingerprint(&n), fingerprint(&back));
    }

    #[test]
    fn nil_round_trips() {
        let n = super::super::nil();
        assert_eq!(to_sexpr(&n), "NIL");
        let back = parse_sexpr("NIL").unwrap();
        assert!(back.is_nil());
    }

    #[test]
    fn quoted_label_with_spaces_round_trips() {
        let n = super::super::entity("two words").unwrap();
        let s = to_sexpr(&n);
        let back = parse_sexpr(&s).unwrap();
        assert_eq!(fingerprint(&n), fingerprint(&back));
    }
}
