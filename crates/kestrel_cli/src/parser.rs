//! Command parser: tokenizes a line into words, quoted literals and
//! punctuation, then builds a `Command`. All values travel as raw text
//! (quotes stripped); typing happens in the engine via coercion and
//! normalization.

use thiserror::Error;

use kestrel_common::datum::Value;
use kestrel_engine::Condition;

/// A parsed user command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable {
        table: String,
        columns: Vec<String>,
    },
    ListTables,
    DropTable {
        table: String,
    },
    Insert {
        table: String,
        values: Vec<Value>,
    },
    Select {
        table: String,
        condition: Option<Condition>,
    },
    /// The condition stays optional here so the engine can reject a
    /// missing WHERE itself.
    Update {
        table: String,
        set_clause: Vec<(String, Value)>,
        condition: Option<Condition>,
    },
    Delete {
        table: String,
        condition: Option<Condition>,
    },
    Info {
        table: String,
    },
    Timing,
    Help,
    Exit,
}

/// Command syntax errors. Recoverable: the REPL reports and keeps
/// reading.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed {command} syntax: expected {expected}")]
    Malformed {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Unterminated quote")]
    UnterminatedQuote,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Punct(char),
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if matches!(ch, '(' | ')' | ',' | '=') {
            chars.next();
            tokens.push(Token::Punct(ch));
        } else if ch == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                text.push(c);
            }
            if !closed {
                return Err(ParseError::UnterminatedQuote);
            }
            tokens.push(Token::Quoted(text));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || matches!(c, '(' | ')' | ',' | '=' | '"') {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }
    Ok(tokens)
}

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    command: &'static str,
}

impl Cursor {
    fn new(tokens: Vec<Token>, command: &'static str) -> Self {
        Self {
            tokens,
            pos: 0,
            command,
        }
    }

    fn malformed(&self, expected: &'static str) -> ParseError {
        ParseError::Malformed {
            command: self.command,
            expected,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the given keyword (case-insensitive).
    fn keyword(&mut self, word: &'static str) -> Result<(), ParseError> {
        match self.next() {
            Some(Token::Word(w)) if w.eq_ignore_ascii_case(word) => Ok(()),
            _ => Err(self.malformed(word)),
        }
    }

    /// True and consumed if the next token is the given keyword.
    fn eat_keyword(&mut self, word: &str) -> bool {
        match self.peek() {
            Some(Token::Word(w)) if w.eq_ignore_ascii_case(word) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn word(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.next() {
            Some(Token::Word(w)) => Ok(w),
            _ => Err(self.malformed(expected)),
        }
    }

    /// A literal value: quoted or bare, always raw text at this stage.
    fn literal(&mut self, expected: &'static str) -> Result<Value, ParseError> {
        match self.next() {
            Some(Token::Word(w)) => Ok(Value::Text(w)),
            Some(Token::Quoted(q)) => Ok(Value::Text(q)),
            _ => Err(self.malformed(expected)),
        }
    }

    fn punct(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        match self.next() {
            Some(Token::Punct(p)) if p == c => Ok(()),
            _ => Err(self.malformed(expected)),
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        match self.peek() {
            Some(Token::Punct(p)) if *p == c => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn end(&mut self) -> Result<(), ParseError> {
        if self.peek().is_none() {
            Ok(())
        } else {
            Err(self.malformed("end of command"))
        }
    }

    /// `<col> = <val>` pair, shared by SET and WHERE clauses.
    fn assignment(&mut self) -> Result<(String, Value), ParseError> {
        let column = self.word("<column>")?;
        self.punct('=', "=")?;
        let value = self.literal("<value>")?;
        Ok((column, value))
    }

    /// Optional trailing `where <col> = <val>`.
    fn where_clause(&mut self) -> Result<Option<Condition>, ParseError> {
        if !self.eat_keyword("where") {
            return Ok(None);
        }
        let (column, value) = self.assignment()?;
        Ok(Some(Condition::new(column, value)))
    }
}

/// Parse one input line into a command.
pub fn parse(input: &str) -> Result<Command, ParseError> {
    let tokens = tokenize(input)?;
    let keyword = match tokens.first() {
        Some(Token::Word(w)) => w.to_lowercase(),
        Some(_) => return Err(ParseError::UnknownCommand(input.trim().to_string())),
        None => return Err(ParseError::Empty),
    };
    let rest: Vec<Token> = tokens[1..].to_vec();

    match keyword.as_str() {
        "create_table" => {
            let mut cur = Cursor::new(rest, "create_table");
            let table = cur.word("<table> <col:type> ...")?;
            let mut columns = Vec::new();
            while cur.peek().is_some() {
                columns.push(cur.word("<col:type>")?);
            }
            Ok(Command::CreateTable { table, columns })
        }
        "list_tables" => {
            let mut cur = Cursor::new(rest, "list_tables");
            cur.end()?;
            Ok(Command::ListTables)
        }
        "drop_table" => {
            let mut cur = Cursor::new(rest, "drop_table");
            let table = cur.word("<table>")?;
            cur.end()?;
            Ok(Command::DropTable { table })
        }
        "insert" => {
            let mut cur = Cursor::new(rest, "insert");
            cur.keyword("into")?;
            let table = cur.word("<table>")?;
            cur.keyword("values")?;
            cur.punct('(', "(")?;
            let mut values = Vec::new();
            if !cur.eat_punct(')') {
                loop {
                    values.push(cur.literal("<value>")?);
                    if cur.eat_punct(')') {
                        break;
                    }
                    cur.punct(',', ", or )")?;
                }
            }
            cur.end()?;
            Ok(Command::Insert { table, values })
        }
        "select" => {
            let mut cur = Cursor::new(rest, "select");
            cur.keyword("from")?;
            let table = cur.word("<table>")?;
            let condition = cur.where_clause()?;
            cur.end()?;
            Ok(Command::Select { table, condition })
        }
        "update" => {
            let mut cur = Cursor::new(rest, "update");
            let table = cur.word("<table>")?;
            cur.keyword("set")?;
            let mut set_clause = vec![cur.assignment()?];
            while cur.eat_punct(',') {
                set_clause.push(cur.assignment()?);
            }
            let condition = cur.where_clause()?;
            cur.end()?;
            Ok(Command::Update {
                table,
                set_clause,
                condition,
            })
        }
        "delete" => {
            let mut cur = Cursor::new(rest, "delete");
            cur.keyword("from")?;
            let table = cur.word("<table>")?;
            let condition = cur.where_clause()?;
            cur.end()?;
            Ok(Command::Delete { table, condition })
        }
        "info" => {
            let mut cur = Cursor::new(rest, "info");
            let table = cur.word("<table>")?;
            cur.end()?;
            Ok(Command::Info { table })
        }
        "timing" => Ok(Command::Timing),
        "help" => Ok(Command::Help),
        "exit" | "quit" => Ok(Command::Exit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}
