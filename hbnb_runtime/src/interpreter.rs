//! Command interpreter: validate a `Command` and run it against storage.
//!
//! Validation order (first failure wins):
//!   1. class name missing     2. class doesn't exist
//!   3. instance id missing    4. no instance found
//!   5. attribute name missing 6. value missing
//!   7. invalid dictionary
//!
//! Mutations (`create`, `update`, `destroy`) save before returning.
//! A failed save is returned as `StorageError` and is never printed as
//! if it were operator error.

use tracing::{info, warn};

use hbnb_engine::value::quote_text;
use hbnb_engine::{coerce, AttrValue, KindRegistry, Record};

use crate::command::{parse_dictionary, parse_line, Command, Input, UpdateArgs, Verb};
use crate::error::{CommandError, StorageError};
use crate::file_storage::FileStorage;

/// Result of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading; print the text if any.
    Continue(Option<String>),
    /// Stop the loop; print the text if any.
    Exit(Option<String>),
}

/// Failure of a single command: operator error or fatal storage error.
enum Failure {
    Command(CommandError),
    Storage(StorageError),
}

impl From<CommandError> for Failure {
    fn from(err: CommandError) -> Self {
        Failure::Command(err)
    }
}

impl From<StorageError> for Failure {
    fn from(err: StorageError) -> Self {
        Failure::Storage(err)
    }
}

pub struct Interpreter {
    registry: KindRegistry,
    storage: FileStorage,
}

impl Interpreter {
    pub fn new(registry: KindRegistry, storage: FileStorage) -> Self {
        Self { registry, storage }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Parse and run one line.
    pub fn handle_line(&mut self, line: &str) -> Result<Outcome, StorageError> {
        match parse_line(line) {
            Input::Empty => Ok(Outcome::Continue(None)),
            Input::Quit => Ok(Outcome::Exit(None)),
            Input::EndOfFile => Ok(Outcome::Exit(Some(String::new()))),
            Input::Help(topic) => Ok(Outcome::Continue(Some(help_text(topic.as_deref())))),
            Input::Unknown(text) => Ok(Outcome::Continue(Some(format!(
                "** Unknown syntax: {} **",
                text
            )))),
            Input::Run(command) => self.execute(&command).map(Outcome::Continue),
        }
    }

    /// Run a parsed command. Operator errors come back as output text.
    pub fn execute(&mut self, command: &Command) -> Result<Option<String>, StorageError> {
        match self.dispatch(command) {
            Ok(output) => Ok(output),
            Err(Failure::Command(err)) => Ok(Some(err.to_string())),
            Err(Failure::Storage(err)) => Err(err),
        }
    }

    fn dispatch(&mut self, command: &Command) -> Result<Option<String>, Failure> {
        if command.verb == Verb::All && command.kind.is_none() {
            return Ok(Some(self.render_all(None)));
        }

        let kind = self.require_kind(command.kind.as_deref())?;
        match command.verb {
            Verb::Create => self.create(&kind).map(Some),
            Verb::All => Ok(Some(self.render_all(Some(&kind)))),
            Verb::Count => Ok(Some(self.storage.map().count(&kind).to_string())),
            Verb::Show => {
                let record = self.require_record(&kind, command.id.as_deref())?;
                Ok(Some(record.to_string()))
            }
            Verb::Destroy => {
                let id = self.require_record(&kind, command.id.as_deref())?.id().to_string();
                self.destroy(&kind, &id)?;
                Ok(None)
            }
            Verb::Update => {
                let id = self.require_record(&kind, command.id.as_deref())?.id().to_string();
                let pairs = update_pairs(&command.update)?;
                self.update(&kind, &id, pairs)?;
                Ok(None)
            }
        }
    }

    // -- validation ----------------------------------------------------

    /// Steps 1-2.
    fn require_kind(&self, kind: Option<&str>) -> Result<String, CommandError> {
        let kind = kind.ok_or(CommandError::MissingKind)?;
        if !self.registry.contains(kind) {
            return Err(CommandError::UnknownKind);
        }
        Ok(kind.to_string())
    }

    /// Steps 3-4.
    fn require_record(&self, kind: &str, id: Option<&str>) -> Result<&Record, CommandError> {
        let id = id.ok_or(CommandError::MissingId)?;
        self.storage
            .map()
            .lookup(kind, id)
            .ok_or(CommandError::NoInstance)
    }

    // -- execution -----------------------------------------------------

    fn create(&mut self, kind: &str) -> Result<String, Failure> {
        let schema = self.registry.get(kind).ok_or(CommandError::UnknownKind)?;
        let record = Record::new(schema);
        let id = record.id().to_string();
        self.storage.map_mut().register(record);
        self.storage.save()?;
        info!(kind, id = %id, "record created");
        Ok(id)
    }

    fn destroy(&mut self, kind: &str, id: &str) -> Result<(), StorageError> {
        if self.storage.map_mut().remove(kind, id) {
            self.storage.save()?;
            info!(kind, id, "record destroyed");
        }
        Ok(())
    }

    /// Apply every pair, bump `updated_at` once, save once. Protected
    /// names are skipped; if nothing was written there is no save.
    fn update(
        &mut self,
        kind: &str,
        id: &str,
        pairs: Vec<(String, AttrValue)>,
    ) -> Result<(), StorageError> {
        let Some(record) = self.storage.map_mut().lookup_mut(kind, id) else {
            return Ok(());
        };

        let mut changed = false;
        for (name, value) in pairs {
            if record.set(&name, value) {
                changed = true;
            } else {
                warn!(kind, id, attribute = %name, "refusing to overwrite protected field");
            }
        }

        if changed {
            record.touch();
            self.storage.save()?;
        }
        Ok(())
    }

    /// `["<record>", ...]`, each entry quoted like a text value.
    fn render_all(&self, kind: Option<&str>) -> String {
        let items: Vec<String> = self
            .storage
            .map()
            .list(kind)
            .iter()
            .map(|r| quote_text(&r.to_string()))
            .collect();
        format!("[{}]", items.join(", "))
    }
}

/// Steps 5-7.
fn update_pairs(args: &UpdateArgs) -> Result<Vec<(String, AttrValue)>, CommandError> {
    match args {
        UpdateArgs::Missing => Err(CommandError::MissingAttribute),
        UpdateArgs::Pair { value: None, .. } => Err(CommandError::MissingValue),
        UpdateArgs::Pair {
            name,
            value: Some(value),
        } => Ok(vec![(name.clone(), coerce(value))]),
        UpdateArgs::Dictionary(text) => parse_dictionary(text),
    }
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

const HELP_TOPICS: [(&str, &str); 9] = [
    ("EOF", "Exit the program on end of input."),
    (
        "all",
        "Print the string form of every instance, or of one class.\nUsage: all [<class name>] | <class name>.all()",
    ),
    (
        "count",
        "Print the number of instances of a class.\nUsage: count <class name> | <class name>.count()",
    ),
    (
        "create",
        "Create an instance of a class, save it and print its id.\nUsage: create <class name>",
    ),
    (
        "destroy",
        "Delete an instance by class name and id and save the change.\nUsage: destroy <class name> <id> | <class name>.destroy(\"<id>\")",
    ),
    ("help", "List available commands with \"help\" or detailed help with \"help <command>\"."),
    ("quit", "Quit command to exit the program."),
    (
        "show",
        "Print the string form of an instance by class name and id.\nUsage: show <class name> <id> | <class name>.show(\"<id>\")",
    ),
    (
        "update",
        "Set one attribute, or several from a dictionary, and save.\nUsage: update <class name> <id> <attribute name> \"<value>\"\n       <class name>.update(\"<id>\", \"<attribute name>\", \"<value>\")\n       <class name>.update(\"<id>\", {<dictionary>})",
    ),
];

fn help_text(topic: Option<&str>) -> String {
    match topic {
        Some(topic) => HELP_TOPICS
            .iter()
            .find(|(name, _)| *name == topic)
            .map(|(_, text)| text.to_string())
            .unwrap_or_else(|| format!("*** No help on {}", topic)),
        None => {
            let header = "Documented commands (type help <topic>):";
            let names: Vec<&str> = HELP_TOPICS.iter().map(|(name, _)| *name).collect();
            format!("{}\n{}\n{}\n", header, "=".repeat(header.len()), names.join("  "))
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
