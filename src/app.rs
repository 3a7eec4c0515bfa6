use std::io::{IsTerminal, Read, Write};

use chrono::Utc;
use colored::Colorize;
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode};

use crate::client::{parse_tags, SecretClient};
use crate::command::Command;
use crate::config::{Config, OutputFormat};
use crate::error::Error;
use crate::output;
use crate::path;
use crate::secret::SecretMetadata;
use crate::select::{Selection, Selector};
use crate::store::ParameterStore;

/// Print a dimmed status message (for progress steps)
fn status(msg: &str) {
    eprintln!("  {}", msg.dimmed());
}

/// Print a success message with checkmark
fn success(msg: &str) {
    println!("\n{} {}", "✓".green(), msg.green());
}

/// Print an info line (normal text, indented)
fn info(msg: &str) {
    eprintln!("  {}", msg);
}

fn warning(msg: &str) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

pub fn version_text() -> String {
    format!(
        "lockr {}\n  commit: {}\n  built:  {}\n",
        env!("CARGO_PKG_VERSION"),
        option_env!("LOCKR_COMMIT").unwrap_or("none"),
        option_env!("LOCKR_BUILD_DATE").unwrap_or("unknown"),
    )
}

/// Read a piped value. Internal newlines are kept, one trailing `\n` is dropped.
fn read_piped<R: Read>(mut reader: R) -> Result<String, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let mut value = String::from_utf8_lossy(&buf).into_owned();
    if value.ends_with('\n') {
        value.pop();
    }
    Ok(value)
}

pub struct App<S> {
    config: Config,
    client: SecretClient<S>,
    selector: Box<dyn Selector>,
    out: Box<dyn Write>,
}

impl<S: ParameterStore> App<S> {
    pub fn new(
        config: Config,
        client: SecretClient<S>,
        selector: Box<dyn Selector>,
        out: Box<dyn Write>,
    ) -> Self {
        Self {
            config,
            client,
            selector,
            out,
        }
    }

    pub fn run(&mut self, cmd: Command) -> Result<(), Error> {
        match cmd {
            Command::Write {
                path,
                value,
                file,
                tags,
                overwrite,
            } => self.write(&path, value.as_deref(), file.as_deref(), &tags, overwrite),
            Command::Read { path, quiet } => self.read(path.as_deref(), quiet),
            Command::List {
                path,
                recursive,
                interactive,
            } => self.list(path.as_deref(), recursive, interactive),
            Command::Delete { path, force } => self.delete(&path, force),
        }
    }

    fn resolve(&self, input: &str) -> Result<String, Error> {
        path::resolve(input, &self.config.prefix, &self.config.env)
    }

    fn write(
        &mut self,
        input: &str,
        value: Option<&str>,
        file: Option<&str>,
        tag_specs: &[String],
        overwrite: bool,
    ) -> Result<(), Error> {
        let path = self.resolve(input)?;

        // file > stdin ('-') > literal > prompt
        let value = match (file, value) {
            (Some(file), _) => {
                let bytes = std::fs::read(file)?;
                String::from_utf8(bytes).map_err(|_| {
                    Error::InvalidInput(format!("{file} is not valid UTF-8"))
                })?
            }
            (None, Some("-")) => read_piped(std::io::stdin().lock())?,
            (None, Some(value)) => value.to_string(),
            (None, None) => match Self::prompt_value()? {
                Some(value) => value,
                None => return Ok(()),
            },
        };

        let tags = parse_tags(tag_specs)?;

        status("Writing secret...");
        let version = self
            .client
            .write(&path, &value, &tags, overwrite, &self.config.kms_key)?;

        success(&format!("Secret written: {} (version {})", path, version));
        for (key, value) in &tags {
            info(&format!("{}: {}", key.dimmed(), value));
        }
        Ok(())
    }

    /// Hidden prompt on a terminal, plain stdin otherwise. `None` if cancelled.
    fn prompt_value() -> Result<Option<String>, Error> {
        if !std::io::stdin().is_terminal() {
            return read_piped(std::io::stdin().lock()).map(Some);
        }

        match Password::new("Enter secret value:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Hidden)
            .prompt()
        {
            Ok(value) => Ok(Some(value)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(e) => Err(Error::Prompt(e.to_string())),
        }
    }

    fn read(&mut self, input: Option<&str>, quiet: bool) -> Result<(), Error> {
        let path = match input {
            Some(input) => self.resolve(input)?,
            None => match self.search_all()? {
                Some(name) => name,
                None => return Ok(()),
            },
        };

        let secret = self.client.read(&path)?;

        if quiet {
            write!(self.out, "{}", secret.value)?;
            return Ok(());
        }

        match self.config.output {
            OutputFormat::Json => writeln!(self.out, "{}", output::secret_json(&secret)?)?,
            OutputFormat::Text => write!(self.out, "{}", output::secret_text(&secret))?,
        }
        Ok(())
    }

    /// Fetch every secret and let the user pick one by name.
    fn search_all(&mut self) -> Result<Option<String>, Error> {
        status("Fetching secrets...");
        let secrets = self.client.list("/", true)?;
        if secrets.is_empty() {
            warning("No secrets found");
            return Ok(None);
        }

        info(&format!("Found {} secrets", secrets.len()));
        let names = secrets.into_iter().map(|s| s.name).collect();
        match self.selector.select(names)? {
            Selection::Chosen(name) => Ok(Some(name)),
            Selection::Cancelled => Ok(None),
        }
    }

    fn list(&mut self, input: Option<&str>, recursive: bool, interactive: bool) -> Result<(), Error> {
        // No path means everything, recursively and interactively.
        let (path, recursive, interactive) = match input {
            Some(input) => (self.resolve(input)?, recursive, interactive),
            None => ("/".to_string(), true, true),
        };

        status("Fetching secrets...");
        let secrets = self.client.list(&path, recursive)?;

        if secrets.is_empty() {
            warning(&format!("No secrets found at {}", path));
            return Ok(());
        }

        match self.config.output {
            OutputFormat::Json => writeln!(self.out, "{}", output::list_json(&secrets)?)?,
            OutputFormat::Text if interactive => self.pick_and_describe(&secrets)?,
            OutputFormat::Text => write!(
                self.out,
                "{}",
                output::list_text(&secrets, &path, Utc::now(), true)
            )?,
        }
        Ok(())
    }

    fn pick_and_describe(&mut self, secrets: &[SecretMetadata]) -> Result<(), Error> {
        info(&format!("Found {} secrets", secrets.len()));
        let names = secrets.iter().map(|s| s.name.clone()).collect();

        if let Selection::Chosen(name) = self.selector.select(names)? {
            if let Some(secret) = secrets.iter().find(|s| s.name == name) {
                write!(self.out, "{}", output::details_text(secret))?;
            }
        }
        Ok(())
    }

    fn delete(&mut self, input: &str, force: bool) -> Result<(), Error> {
        let path = self.resolve(input)?;

        if !self.client.exists(&path)? {
            return Err(Error::NotFound(path));
        }

        if !force {
            warning(&format!("You are about to delete: {}", path.red()));
            let confirmed = match Confirm::new("Are you sure you want to delete this secret?")
                .with_default(false)
                .prompt()
            {
                Ok(answer) => answer,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => false,
                Err(e) => return Err(Error::Prompt(e.to_string())),
            };
            if !confirmed {
                info("Cancelled");
                return Ok(());
            }
        }

        status("Deleting secret...");
        self.client.delete(&path)?;
        success(&format!("Deleted: {}", path));
        Ok(())
    }
}
