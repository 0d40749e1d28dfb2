//! Command encoding
//!
//! Commands are a name followed by arguments on a single line. Arguments
//! that are not plain tokens are wrapped in double quotes with `"` and `\`
//! escaped by a backslash.

use std::borrow::Cow;
use std::fmt;

use rmpdc_core::error::{Result, RmpdcError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: &'static str,
    args: Vec<String>,
    /// Arguments are masked in logs (passwords)
    sensitive: bool,
}

impl Command {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
            sensitive: false,
        }
    }

    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    pub fn opt_arg<T: fmt::Display>(self, value: Option<T>) -> Self {
        match value {
            Some(v) => self.arg(v),
            None => self,
        }
    }

    /// Boolean arguments are sent as `0` / `1`
    pub fn bool_arg(self, value: bool) -> Self {
        self.arg(if value { 1 } else { 0 })
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Encode as a newline-terminated protocol line
    pub fn to_line(&self) -> Result<String> {
        let mut line = String::from(self.name);
        for arg in &self.args {
            if arg.contains('\n') || arg.contains('\r') {
                return Err(RmpdcError::Argument(format!(
                    "argument to '{}' contains a line break",
                    self.name
                )));
            }
            line.push(' ');
            line.push_str(&quote_arg(arg));
        }
        line.push('\n');
        Ok(line)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        for arg in &self.args {
            if self.sensitive {
                f.write_str(" ******")?;
            } else {
                write!(f, " {}", quote_arg(arg))?;
            }
        }
        Ok(())
    }
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '/' | '+' | '-')
}

/// Quote an argument unless it is a plain token
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(is_plain) {
        return Cow::Borrowed(arg);
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Commands executed as one batch
///
/// Sent between `command_list_ok_begin` and `command_list_end` so each
/// successful command is acknowledged with `list_OK`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn to_payload(&self) -> Result<String> {
        let mut payload = String::from("command_list_ok_begin\n");
        for command in &self.commands {
            payload.push_str(&command.to_line()?);
        }
        payload.push_str("command_list_end\n");
        Ok(payload)
    }
}

impl FromIterator<Command> for CommandList {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
