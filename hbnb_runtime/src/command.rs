//! Command parsing for both console grammars.
//!
//!   verb form:   `<verb> [kind] [id] [attr] [value]`
//!   dotted form: `<kind>.<verb>(<args>)`
//!
//! Both produce the same `Command`; validation and execution happen once,
//! in the interpreter, so the grammars cannot drift apart.

use serde_json::Value;

use hbnb_engine::{coerce, AttrValue};

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Show,
    Destroy,
    All,
    Update,
    Count,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Create,
        Verb::Show,
        Verb::Destroy,
        Verb::All,
        Verb::Update,
        Verb::Count,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Show => "show",
            Verb::Destroy => "destroy",
            Verb::All => "all",
            Verb::Update => "update",
            Verb::Count => "count",
        }
    }
}

/// What follows the id in an `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateArgs {
    /// No attribute name given.
    Missing,
    /// A single `attr value` pair; `value` may be absent.
    Pair { name: String, value: Option<String> },
    /// A `{...}` literal, unparsed.
    Dictionary(String),
}

/// One parsed command, independent of the grammar it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    pub kind: Option<String>,
    pub id: Option<String>,
    pub update: UpdateArgs,
}

impl Command {
    fn new(verb: Verb, kind: Option<String>, id: Option<String>) -> Self {
        Self {
            verb,
            kind,
            id,
            update: UpdateArgs::Missing,
        }
    }
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    /// The literal `EOF` command.
    EndOfFile,
    Help(Option<String>),
    Run(Command),
    Unknown(String),
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    let (head, rest) = split_head(line);
    match head {
        "quit" => return Input::Quit,
        "EOF" => return Input::EndOfFile,
        "help" => {
            let topic = split_head(rest).0;
            return Input::Help((!topic.is_empty()).then(|| topic.to_string()));
        }
        _ => {}
    }

    let parsed = match Verb::from_name(head) {
        Some(verb) => parse_verb_form(verb, rest),
        None => parse_dotted_form(line),
    };
    match parsed {
        Some(command) => Input::Run(command),
        None => Input::Unknown(line.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Verb form
// ---------------------------------------------------------------------------

/// `None` on an unterminated quote, which the dotted form rejects too.
fn parse_verb_form(verb: Verb, args: &str) -> Option<Command> {
    let (kind, rest) = next_word(args)?;
    let (id, rest) = next_word(rest)?;
    let mut command = Command::new(
        verb,
        kind.and_then(non_empty_owned),
        id.and_then(non_empty_owned),
    );

    if verb == Verb::Update {
        command.update = parse_update_tail(rest)?;
    }
    Some(command)
}

/// `attr value` or `{...}`, after the id.
fn parse_update_tail(rest: &str) -> Option<UpdateArgs> {
    let rest = rest.trim();
    if rest.starts_with('{') {
        return Some(UpdateArgs::Dictionary(rest.to_string()));
    }

    let (name, rest) = next_word(rest)?;
    let Some(name) = name else {
        return Some(UpdateArgs::Missing);
    };
    let (value, _) = next_word(rest)?;
    Some(UpdateArgs::Pair { name, value })
}

/// Next whitespace-delimited word and the remainder; `(None, "")` once the
/// input is exhausted. A word opening with a quote runs to the matching
/// quote.
fn next_word(s: &str) -> Option<(Option<String>, &str)> {
    let s = s.trim_start();
    let (word, tail) = match s.chars().next() {
        None => return Some((None, "")),
        Some(q @ ('"' | '\'')) => close_quote(s, q)?,
        Some(_) => s.split_at(s.find(char::is_whitespace).unwrap_or(s.len())),
    };
    Some((Some(word.to_string()), tail))
}

// ---------------------------------------------------------------------------
// Dotted form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum CallArg {
    Text(String),
    Dict(String),
}

impl CallArg {
    fn into_text(self) -> String {
        match self {
            CallArg::Text(s) | CallArg::Dict(s) => s,
        }
    }
}

/// `<kind>.<verb>(<args>)`. `None` means unknown syntax.
fn parse_dotted_form(line: &str) -> Option<Command> {
    let (kind, call) = line.split_once('.')?;
    if kind.chars().any(char::is_whitespace) {
        return None;
    }
    let open = call.find('(')?;
    let verb = Verb::from_name(call[..open].trim())?;
    let args = call[open + 1..].strip_suffix(')')?;
    let mut args = split_call_args(args)?.into_iter();

    let mut command = Command::new(verb, non_empty(kind), None);
    match verb {
        Verb::Create | Verb::All | Verb::Count => {}
        Verb::Show | Verb::Destroy => {
            command.id = args.next().map(CallArg::into_text).and_then(non_empty_owned);
        }
        Verb::Update => {
            command.id = args.next().map(CallArg::into_text).and_then(non_empty_owned);
            command.update = match args.next() {
                None => UpdateArgs::Missing,
                Some(CallArg::Dict(text)) => UpdateArgs::Dictionary(text),
                Some(CallArg::Text(name)) => UpdateArgs::Pair {
                    name,
                    value: args.next().map(CallArg::into_text),
                },
            };
        }
    }
    Some(command)
}

/// Split `"a", 'b', c, {...}`. A `{` starts a dictionary that runs to the
/// end. `None` on an unterminated quote or junk between arguments.
fn split_call_args(args: &str) -> Option<Vec<CallArg>> {
    let mut out = Vec::new();
    let mut rest = args.trim();

    while !rest.is_empty() {
        if rest.starts_with('{') {
            out.push(CallArg::Dict(rest.to_string()));
            break;
        }

        let tail = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let (body, tail) = close_quote(rest, q)?;
                out.push(CallArg::Text(body.to_string()));
                tail
            }
            _ => {
                let end = rest.find(',').unwrap_or(rest.len());
                out.push(CallArg::Text(rest[..end].trim().to_string()));
                &rest[end..]
            }
        };

        rest = tail.trim_start();
        if !rest.is_empty() {
            rest = rest.strip_prefix(',')?.trim_start();
        }
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Dictionary literals
// ---------------------------------------------------------------------------

/// Parse a `{...}` update literal. Single quotes are accepted as double.
///
/// String values go through `coerce`; numbers, booleans, lists and nested
/// objects keep their JSON type. `null` is rejected.
pub fn parse_dictionary(text: &str) -> Result<Vec<(String, AttrValue)>, CommandError> {
    let text = text.trim();
    if !(text.starts_with('{') && text.ends_with('}')) {
        return Err(CommandError::InvalidDictionary);
    }

    let parsed: Value = serde_json::from_str(&text.replace('\'', "\""))
        .map_err(|_| CommandError::InvalidDictionary)?;
    let Value::Object(obj) = parsed else {
        return Err(CommandError::InvalidDictionary);
    };

    obj.into_iter()
        .map(|(name, value)| {
            let value = match &value {
                Value::String(s) => coerce(s),
                other => AttrValue::from_json(&name, other)
                    .map_err(|_| CommandError::InvalidDictionary)?,
            };
            Ok((name, value))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First whitespace-delimited token and the remainder.
fn split_head(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// Body of an argument opened by quote `q`, and the text after the closing
/// quote. The body is taken verbatim: `#` and `\` have no special meaning.
fn close_quote(s: &str, q: char) -> Option<(&str, &str)> {
    let body = &s[q.len_utf8()..];
    let end = body.find(q)?;
    Some((&body[..end], &body[end + q.len_utf8()..]))
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn non_empty_owned(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
