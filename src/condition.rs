/**
 * Boolean filter expressions over record fields, e.g.
 * `GPS.Status >= 3 and not MODE.Mode == "RTL"`.
 */

use crate::error::{ConvertError, Result};
use crate::record::Value;


/**
 * Resolves a field reference. `type_name` is `None` for a bare field name,
 * which always refers to the candidate record.
 */
pub trait FieldLookup {
    fn lookup(&self, type_name: Option<&str>, field: &str) -> Option<&Value>;
}


#[derive(Clone, Copy, Debug, PartialEq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}


#[derive(Clone, Debug, PartialEq)]
enum Operand {
    Field { type_name: Option<String>, field: String },
    Number(f64),
    Text(String),
}


#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(Operand, CompareOp, Operand),
    Truthy(Operand),
}


#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Text(String),
    Compare(CompareOp),
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
}


/**
 * A parsed condition. Parsing happens once, before any record is read.
 */
#[derive(Clone, Debug)]
pub struct Condition {
    source: String,
    expr: Expr,
}


enum Resolved<'a> {
    Number(f64),
    Text(&'a str),
}


impl Condition {
    pub fn parse(source: &str) -> Result<Condition> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens: &tokens, position: 0, end: source.len() };
        let expr = parser.or_expr()?;
        if let Some(&(offset, _)) = parser.peek_full() {
            return Err(bad_condition(offset, "unexpected trailing input"));
        }
        Ok(Condition { source: source.to_string(), expr })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, fields: &dyn FieldLookup) -> bool {
        evaluate(&self.expr, fields)
    }
}


fn bad_condition(offset: usize, message: &str) -> ConvertError {
    ConvertError::Condition { offset, message: message.to_string() }
}


fn tokenize(source: &str) -> Result<Vec<(usize, Token)>> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, n)| n);
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let two = next.map(|n| [c, n]);
        let (token, width) = match two {
            Some(['=', '=']) => (Token::Compare(CompareOp::Eq), 2),
            Some(['!', '=']) => (Token::Compare(CompareOp::Ne), 2),
            Some(['<', '=']) => (Token::Compare(CompareOp::Le), 2),
            Some(['>', '=']) => (Token::Compare(CompareOp::Ge), 2),
            Some(['&', '&']) => (Token::And, 2),
            Some(['|', '|']) => (Token::Or, 2),
            _ => match c {
                '<' => (Token::Compare(CompareOp::Lt), 1),
                '>' => (Token::Compare(CompareOp::Gt), 1),
                '!' => (Token::Not, 1),
                '(' => (Token::LeftParen, 1),
                ')' => (Token::RightParen, 1),
                '"' | '\'' => {
                    let mut end = i + 1;
                    while end < chars.len() && chars[end].1 != c {
                        end += 1;
                    }
                    if end == chars.len() {
                        return Err(bad_condition(offset, "unterminated string"));
                    }
                    let text: String = chars[i + 1..end].iter().map(|&(_, ch)| ch).collect();
                    (Token::Text(text), end + 1 - i)
                },
                _ if c.is_ascii_digit()
                    || (c == '-' && next.map_or(false, |n| n.is_ascii_digit() || n == '.'))
                    || (c == '.' && next.map_or(false, |n| n.is_ascii_digit())) => {
                    let mut end = i + 1;
                    while end < chars.len()
                        && (chars[end].1.is_ascii_digit() || chars[end].1 == '.')
                    {
                        end += 1;
                    }
                    let text: String = chars[i..end].iter().map(|&(_, ch)| ch).collect();
                    match text.parse::<f64>() {
                        Ok(number) => (Token::Number(number), end - i),
                        Err(_) => return Err(bad_condition(offset, "malformed number")),
                    }
                },
                _ if c.is_ascii_alphabetic() || c == '_' => {
                    let mut end = i + 1;
                    while end < chars.len()
                        && (chars[end].1.is_ascii_alphanumeric()
                            || chars[end].1 == '_'
                            || chars[end].1 == '.')
                    {
                        end += 1;
                    }
                    let word: String = chars[i..end].iter().map(|&(_, ch)| ch).collect();
                    let token = match word.as_str() {
                        "and" => Token::And,
                        "or" => Token::Or,
                        "not" => Token::Not,
                        _ => Token::Ident(word),
                    };
                    (token, end - i)
                },
                _ => return Err(bad_condition(offset, "unexpected character")),
            },
        };
        tokens.push((offset, token));
        i += width;
    }
    Ok(tokens)
}


struct Parser<'a> {
    tokens: &'a [(usize, Token)],
    position: usize,
    end: usize,
}


impl<'a> Parser<'a> {
    fn peek_full(&self) -> Option<&'a (usize, Token)> {
        self.tokens.get(self.position)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_full().map(|&(_, ref token)| token)
    }

    fn offset(&self) -> usize {
        self.peek_full().map_or(self.end, |&(offset, _)| offset)
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.position += 1;
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut left = self.not_expr()?;
        while self.peek() == Some(&Token::And) {
            self.position += 1;
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.position += 1;
            return Ok(Expr::Not(Box::new(self.not_expr()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::LeftParen) {
            self.position += 1;
            let inner = self.or_expr()?;
            if self.peek() != Some(&Token::RightParen) {
                return Err(bad_condition(self.offset(), "expected ')'"));
            }
            self.position += 1;
            return Ok(inner);
        }

        let left = self.operand()?;
        match self.peek() {
            Some(&Token::Compare(op)) => {
                self.position += 1;
                let right = self.operand()?;
                Ok(Expr::Compare(left, op, right))
            },
            _ => Ok(Expr::Truthy(left)),
        }
    }

    fn operand(&mut self) -> Result<Operand> {
        let offset = self.offset();
        let operand = match self.peek() {
            Some(&Token::Number(n)) => Operand::Number(n),
            Some(&Token::Text(ref s)) => Operand::Text(s.clone()),
            Some(&Token::Ident(ref name)) => {
                let mut parts = name.splitn(2, '.');
                let first = parts.next().unwrap_or("");
                match parts.next() {
                    Some(field) if !field.is_empty() && !field.contains('.') => Operand::Field {
                        type_name: Some(first.to_string()),
                        field: field.to_string(),
                    },
                    Some(_) => return Err(bad_condition(offset, "malformed field reference")),
                    None => Operand::Field { type_name: None, field: first.to_string() },
                }
            },
            Some(_) => return Err(bad_condition(offset, "expected a field or literal")),
            None => return Err(bad_condition(offset, "unexpected end of condition")),
        };
        self.position += 1;
        Ok(operand)
    }
}


fn resolve<'a>(operand: &'a Operand, fields: &'a dyn FieldLookup) -> Option<Resolved<'a>> {
    match *operand {
        Operand::Number(n) => Some(Resolved::Number(n)),
        Operand::Text(ref s) => Some(Resolved::Text(s)),
        Operand::Field { ref type_name, ref field } => {
            match fields.lookup(type_name.as_ref().map(|s| s.as_str()), field)? {
                &Value::Text(ref s) => Some(Resolved::Text(s)),
                value => value.as_f64().map(Resolved::Number),
            }
        },
    }
}


fn evaluate(expr: &Expr, fields: &dyn FieldLookup) -> bool {
    match *expr {
        Expr::Or(ref left, ref right) => evaluate(left, fields) || evaluate(right, fields),
        Expr::And(ref left, ref right) => evaluate(left, fields) && evaluate(right, fields),
        Expr::Not(ref inner) => !evaluate(inner, fields),
        Expr::Truthy(ref operand) => match resolve(operand, fields) {
            Some(Resolved::Number(n)) => n != 0.0,
            Some(Resolved::Text(s)) => !s.is_empty(),
            None => false,
        },
        Expr::Compare(ref left, op, ref right) => {
            let (left, right) = match (resolve(left, fields), resolve(right, fields)) {
                (Some(l), Some(r)) => (l, r),
                _ => return false,
            };
            match (left, right) {
                (Resolved::Number(l), Resolved::Number(r)) => compare(l.partial_cmp(&r), op),
                (Resolved::Text(l), Resolved::Text(r)) => compare(Some(l.cmp(r)), op),
                // Mixed types are never equal and never ordered
                _ => op == CompareOp::Ne,
            }
        },
    }
}


fn compare(ordering: Option<std::cmp::Ordering>, op: CompareOp) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match (ordering, op) {
        (None, CompareOp::Ne) => true,
        (None, _) => false,
        (Some(o), CompareOp::Eq) => o == Equal,
        (Some(o), CompareOp::Ne) => o != Equal,
        (Some(o), CompareOp::Lt) => o == Less,
        (Some(o), CompareOp::Le) => o != Greater,
        (Some(o), CompareOp::Gt) => o == Greater,
        (Some(o), CompareOp::Ge) => o != Less,
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{Condition, FieldLookup};
    use crate::error::ConvertError;
    use crate::record::Value;

    struct Fields {
        current: &'static str,
        values: HashMap<(&'static str, &'static str), Value>,
    }

    impl FieldLookup for Fields {
        fn lookup(&self, type_name: Option<&str>, field: &str) -> Option<&Value> {
            let type_name = type_name.unwrap_or(self.current);
            self.values
                .iter()
                .find(|&(&(t, f), _)| t == type_name && f == field)
                .map(|(_, v)| v)
        }
    }

    fn fields() -> Fields {
        let mut values = HashMap::new();
        values.insert(("GPS", "Status"), Value::Int(3));
        values.insert(("GPS", "Alt"), Value::Float(-2.5));
        values.insert(("MODE", "Mode"), Value::Text("AUTO".to_string()));
        values.insert(("MODE", "ModeNum"), Value::Int(0));
        Fields { current: "GPS", values }
    }

    fn check(source: &str) -> bool {
        Condition::parse(source).unwrap().evaluate(&fields())
    }

    #[test]
    fn test_comparisons() {
        assert!(check("GPS.Status >= 3"));
        assert!(check("GPS.Status == 3"));
        assert!(!check("GPS.Status > 3"));
        assert!(check("Status < 4"));
        assert!(check("Alt <= -2.5"));
        assert!(check("Alt != 0"));
        assert!(check("MODE.Mode == \"AUTO\""));
        assert!(check("MODE.Mode != 'RTL'"));
    }

    #[test]
    fn test_boolean_operators() {
        assert!(check("GPS.Status >= 3 and MODE.Mode == 'AUTO'"));
        assert!(check("GPS.Status > 3 or MODE.Mode == 'AUTO'"));
        assert!(!check("not GPS.Status == 3"));
        assert!(check("!(GPS.Status == 2) && (Alt < 0 || Status == 0)"));
    }

    #[test]
    fn test_truthiness() {
        assert!(check("GPS.Status"));
        assert!(!check("MODE.ModeNum"));
        assert!(check("MODE.Mode"));
    }

    #[test]
    fn test_unresolved_reference_is_false() {
        assert!(!check("ATT.Roll > 0"));
        assert!(!check("ATT.Roll"));
        assert!(!check("NoSuchField == 1"));
        assert!(check("not ATT.Roll > 0"));
    }

    #[test]
    fn test_mixed_types() {
        assert!(!check("MODE.Mode == 3"));
        assert!(check("MODE.Mode != 3"));
    }

    #[test]
    fn test_parse_errors() {
        for bad in &["GPS.Status >=", "(GPS.Status == 3", "GPS.Status == 'open", "a.b.c == 1", "# == 1", "1 2"] {
            match Condition::parse(bad) {
                Err(ConvertError::Condition { .. }) => (),
                other => panic!("{} parsed as {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_error_offset() {
        match Condition::parse("GPS.Status == 3 $") {
            Err(ConvertError::Condition { offset, .. }) => assert_eq!(offset, 16),
            other => panic!("unexpected {:?}", other),
        }
    }
}
