//! Recursive-descent parser (§4.2): turns a token stream into a tree of
//! [`Value`]s. Reader macros (`'`, `` ` ``, `~`, `~@`, `@`, `#(`) are emitted
//! as marker forms here and resolved later by [`crate::expand`].

use crate::error::ReadError;
use crate::intern::InternStore;
use crate::lexer::{Token, TokenKind};
use crate::value::{Keyword, PersistentMap, Seq, SpecialForm, Symbol, Value};

/// Reserved reader-marker symbol names, consumed entirely by
/// [`crate::expand`] before evaluation ever sees them.
pub mod markers {
    pub const SYNTAX_QUOTE: &str = "syntax-quote";
    pub const UNQUOTE: &str = "unquote";
    pub const UNQUOTE_SPLICING: &str = "unquote-splicing";
    pub const DEREF: &str = "deref";
    pub const FN_LIT: &str = "fn-lit";
}

/// Parses every top-level form in `tokens`.
pub fn parse_all(tokens: &[Token], interner: &mut InternStore) -> Result<Vec<Value>, ReadError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        interner,
        in_fn_lit: false,
    };
    let mut forms = Vec::new();
    while parser.pos < parser.tokens.len() {
        forms.push(parser.parse_form()?);
    }
    Ok(forms)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    interner: &'a mut InternStore,
    in_fn_lit: bool,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn sym(&mut self, name: &str) -> Symbol {
        Symbol::unqualified(self.interner.intern(name))
    }

    fn marker(&mut self, name: &str, arg: Value) -> Value {
        let head = Value::Symbol(self.sym(name));
        Value::Seq(Seq::from_vec(vec![head, arg]))
    }

    fn parse_form(&mut self) -> Result<Value, ReadError> {
        let tok = self.peek().ok_or(ReadError::UnfinishedForm)?.clone();
        match tok.kind {
            TokenKind::LParen => self.parse_list(),
            TokenKind::LBracket => self.parse_vector(),
            TokenKind::LBrace => self.parse_map(),
            TokenKind::HashParen => self.parse_fn_lit(),
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                Err(ReadError::MismatchedDelimiter {
                    expected: '(',
                    found: closer_char(&tok.kind),
                    span: tok.span,
                })
            }
            TokenKind::Quote => {
                self.bump();
                let inner = self.parse_form()?;
                Ok(Value::Seq(Seq::from_vec(vec![
                    Value::Special(SpecialForm::Quote),
                    inner,
                ])))
            }
            TokenKind::Backtick => {
                self.bump();
                let inner = self.parse_form()?;
                Ok(self.marker(markers::SYNTAX_QUOTE, inner))
            }
            TokenKind::Tilde => {
                self.bump();
                let inner = self.parse_form()?;
                Ok(self.marker(markers::UNQUOTE, inner))
            }
            TokenKind::TildeAt => {
                self.bump();
                let inner = self.parse_form()?;
                Ok(self.marker(markers::UNQUOTE_SPLICING, inner))
            }
            TokenKind::At => {
                self.bump();
                let inner = self.parse_form()?;
                Ok(self.marker(markers::DEREF, inner))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_list(&mut self) -> Result<Value, ReadError> {
        self.bump(); // '('
        let elems = self.parse_until(TokenKind::RParen, ')')?;
        Ok(Value::Seq(Seq::from_vec(elems)))
    }

    fn parse_vector(&mut self) -> Result<Value, ReadError> {
        self.bump(); // '['
        let elems = self.parse_until(TokenKind::RBracket, ']')?;
        Ok(Value::vector(elems))
    }

    fn parse_map(&mut self) -> Result<Value, ReadError> {
        self.bump(); // '{'
        let elems = self.parse_until(TokenKind::RBrace, '}')?;
        if elems.len() % 2 != 0 {
            return Err(ReadError::MapKVMismatch);
        }
        let mut pairs = Vec::with_capacity(elems.len() / 2);
        let mut it = elems.into_iter();
        while let (Some(k), Some(v)) = (it.next(), it.next()) {
            pairs.push((k, v));
        }
        Ok(Value::Map(PersistentMap::from_pairs(pairs)))
    }

    fn parse_fn_lit(&mut self) -> Result<Value, ReadError> {
        if self.in_fn_lit {
            return Err(ReadError::NestedFnLiteral);
        }
        self.bump(); // '#('
        self.in_fn_lit = true;
        let elems = self.parse_until(TokenKind::RParen, ')');
        self.in_fn_lit = false;
        let elems = elems?;
        let body = Value::Seq(Seq::from_vec(elems));
        Ok(self.marker(markers::FN_LIT, body))
    }

    fn parse_until(&mut self, closer: TokenKind, closer_ch: char) -> Result<Vec<Value>, ReadError> {
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None => return Err(ReadError::UnfinishedForm),
                Some(tok) if tok.kind == closer => {
                    self.bump();
                    return Ok(out);
                }
                Some(tok)
                    if matches!(
                        tok.kind,
                        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
                    ) =>
                {
                    return Err(ReadError::MismatchedDelimiter {
                        expected: closer_ch,
                        found: closer_char(&tok.kind),
                        span: tok.span,
                    })
                }
                Some(_) => out.push(self.parse_form()?),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Value, ReadError> {
        let tok = self.bump().expect("checked by caller").clone();
        Ok(match tok.kind {
            TokenKind::Nil => Value::Nil,
            TokenKind::Bool(b) => Value::Bool(b),
            TokenKind::Int(i) => Value::Int(i),
            TokenKind::Float(f) => Value::Float(f),
            TokenKind::Str(s) => Value::string(s),
            TokenKind::Char(c) => Value::Char(c),
            TokenKind::Keyword(name) => Value::Keyword(Keyword {
                ns: None,
                name: self.interner.intern(&name),
            }),
            TokenKind::Special(tag) => Value::Special(tag),
            TokenKind::Ident(name) => Value::Symbol(parse_symbol(&name, self.interner)),
            other => unreachable!("non-atom token {:?} reached parse_atom", other),
        })
    }
}

fn closer_char(kind: &TokenKind) -> char {
    match kind {
        TokenKind::RParen => ')',
        TokenKind::RBracket => ']',
        TokenKind::RBrace => '}',
        _ => '?',
    }
}

/// Splits `name` on the first `/` to build a (possibly) namespace-qualified
/// symbol; a bare `/` (Clojure's division-function convention) is treated
/// as an unqualified symbol named `/`.
fn parse_symbol(name: &str, interner: &mut InternStore) -> Symbol {
    if name != "/" {
        if let Some(idx) = name.find('/') {
            let (ns, rest) = (&name[..idx], &name[idx + 1..]);
            if !ns.is_empty() && !rest.is_empty() {
                return Symbol::qualified(interner.intern(ns), interner.intern(rest));
            }
        }
    }
    Symbol::unqualified(interner.intern(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_one(src: &str) -> (Value, InternStore) {
        let mut interner = InternStore::new();
        let toks = tokenize(src).unwrap();
        let mut forms = parse_all(&toks, &mut interner).unwrap();
        (forms.remove(0), interner)
    }

    #[test]
    fn parses_a_simple_list() {
        let (v, _) = parse_one("(+ 1 2)");
        let items = match v {
            Value::Seq(s) => s.to_vec_realized(),
            _ => panic!("expected a seq"),
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], Value::Int(1));
        assert_eq!(items[2], Value::Int(2));
    }

    #[test]
    fn parses_a_vector() {
        let (v, _) = parse_one("[1 2 3]");
        match v {
            Value::Vector(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected a vector"),
        }
    }

    #[test]
    fn parses_a_map() {
        let (v, _) = parse_one("{:a 1 :b 2}");
        match v {
            Value::Map(m) => assert_eq!(m.len(), 2),
            _ => panic!("expected a map"),
        }
    }

    #[test]
    fn rejects_odd_map() {
        let mut interner = InternStore::new();
        let toks = tokenize("{:a 1 :b}").unwrap();
        assert!(matches!(
            parse_all(&toks, &mut interner),
            Err(ReadError::MapKVMismatch)
        ));
    }

    #[test]
    fn rejects_mismatched_delimiter() {
        let mut interner = InternStore::new();
        let toks = tokenize("(foo]").unwrap();
        assert!(matches!(
            parse_all(&toks, &mut interner),
            Err(ReadError::MismatchedDelimiter { .. })
        ));
    }

    #[test]
    fn rejects_unfinished_form() {
        let mut interner = InternStore::new();
        let toks = tokenize("(foo").unwrap();
        assert!(matches!(
            parse_all(&toks, &mut interner),
            Err(ReadError::UnfinishedForm)
        ));
    }

    #[test]
    fn quote_becomes_a_special_form_list() {
        let (v, _) = parse_one("'x");
        match v {
            Value::Seq(s) => {
                let items = s.to_vec_realized();
                assert_eq!(items[0], Value::Special(SpecialForm::Quote));
            }
            _ => panic!("expected a seq"),
        }
    }

    #[test]
    fn syntax_quote_becomes_a_marker_list() {
        let (v, mut interner) = parse_one("`x");
        match v {
            Value::Seq(s) => {
                let items = s.to_vec_realized();
                let expected = Symbol::unqualified(interner.intern(markers::SYNTAX_QUOTE));
                assert_eq!(items[0], Value::Symbol(expected));
            }
            _ => panic!("expected a seq"),
        }
    }

    #[test]
    fn qualified_symbol_splits_on_slash() {
        let (v, mut interner) = parse_one("ns/foo");
        let expected = Symbol::qualified(interner.intern("ns"), interner.intern("foo"));
        assert_eq!(v, Value::Symbol(expected));
    }

    #[test]
    fn nested_fn_lit_is_rejected() {
        let mut interner = InternStore::new();
        let toks = tokenize("#(+ % #(- % 1))").unwrap();
        assert!(matches!(
            parse_all(&toks, &mut interner),
            Err(ReadError::NestedFnLiteral)
        ));
    }
}
