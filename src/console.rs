//! Interactive console front end
//!
//! A numbered menu over a running [`Dispatcher`]: queue messages, change the sink
//! level, inspect history and status. Input and output are generic so the menu can
//! be driven from scripted input in tests.

use crate::core::{DispatchError, Dispatcher, LogLevel, Result, Sink};
use crate::validation::{parse_menu_choice, validate_message};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[cfg(feature = "console")]
use colored::Colorize;

enum Flow {
    Continue,
    Quit,
}

pub struct ConsoleApp<R, W> {
    dispatcher: Dispatcher,
    sink: Arc<dyn Sink>,
    input: R,
    output: W,
    use_colors: bool,
}

impl<R: BufRead, W: Write> ConsoleApp<R, W> {
    /// Wrap a dispatcher; it must have a sink
    pub fn new(dispatcher: Dispatcher, input: R, output: W) -> Result<Self> {
        let sink = dispatcher.sink().cloned().ok_or(DispatchError::NoSink)?;
        Ok(Self {
            dispatcher,
            sink,
            input,
            output,
            use_colors: false,
        })
    }

    /// Color level tags in the history view (needs the `console` feature)
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn into_parts(self) -> (Dispatcher, W) {
        (self.dispatcher, self.output)
    }

    /// Run the menu until the user quits or input ends, then stop the dispatcher
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "=== Log Dispatcher ===")?;

        loop {
            writeln!(self.output, "\nCurrent level: {}", self.sink.level())?;
            self.show_menu()?;

            let flow = match self.read_choice(1, 5, "Select menu item: ")? {
                Some(1) => self.add_log()?,
                Some(2) => self.change_log_level()?,
                Some(3) => self.show_history()?,
                Some(4) => self.show_status()?,
                _ => Flow::Quit,
            };

            if let Flow::Quit = flow {
                break;
            }
        }

        self.dispatcher.stop();
        self.output.flush()
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "1 Add message")?;
        writeln!(self.output, "2 Change level")?;
        writeln!(self.output, "3 Show history")?;
        writeln!(self.output, "4 Status")?;
        writeln!(self.output, "5 Quit")?;
        writeln!(self.output, "Levels: DEBUG, INFO, ERROR\n")
    }

    fn add_log(&mut self) -> io::Result<Flow> {
        let Some(level) = self.select_level()? else {
            return Ok(Flow::Quit);
        };

        write!(self.output, "Enter message: ")?;
        self.output.flush()?;
        let Some(message) = self.read_line()? else {
            return Ok(Flow::Quit);
        };

        if validate_message(&message) {
            self.dispatcher.submit(message, level);
            writeln!(self.output, "Message queued")?;
        } else {
            writeln!(self.output, "Error: empty message")?;
        }
        Ok(Flow::Continue)
    }

    fn change_log_level(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "Current level: {}", self.sink.level())?;
        let Some(level) = self.select_level()? else {
            return Ok(Flow::Quit);
        };
        self.sink.set_level(level);
        writeln!(self.output, "Level set to {}", level)?;
        Ok(Flow::Continue)
    }

    fn show_history(&mut self) -> io::Result<Flow> {
        let history = self.dispatcher.history_snapshot();
        if history.is_empty() {
            writeln!(self.output, "History is empty")?;
            return Ok(Flow::Continue);
        }

        for (i, entry) in history.iter().enumerate() {
            let entry = self.colorize(entry);
            writeln!(self.output, "{} {}", i + 1, entry)?;
        }
        Ok(Flow::Continue)
    }

    fn show_status(&mut self) -> io::Result<Flow> {
        let metrics = self.dispatcher.metrics();
        writeln!(self.output, "Sink type: {}", self.sink.type_tag())?;
        writeln!(self.output, "Target: {}", self.sink.target())?;
        writeln!(self.output, "Current level: {}", self.sink.level())?;
        writeln!(self.output, "Pending: {}", self.dispatcher.queue_depth())?;
        writeln!(self.output, "Total messages: {}", self.dispatcher.history_count())?;
        writeln!(
            self.output,
            "Delivered: {}, filtered: {}, failed: {}",
            metrics.delivered(),
            metrics.filtered(),
            metrics.failed()
        )?;
        Ok(Flow::Continue)
    }

    fn select_level(&mut self) -> io::Result<Option<LogLevel>> {
        writeln!(self.output, "Select level:")?;
        writeln!(self.output, "1 DEBUG (lowest)")?;
        writeln!(self.output, "2 INFO")?;
        writeln!(self.output, "3 ERROR")?;

        Ok(self
            .read_choice(1, 3, "Select menu item: ")?
            .map(|choice| match choice {
                1 => LogLevel::Debug,
                2 => LogLevel::Info,
                _ => LogLevel::Error,
            }))
    }

    /// Prompt until a number in range arrives; `None` when input ends
    fn read_choice(&mut self, min: u32, max: u32, prompt: &str) -> io::Result<Option<u32>> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            if let Some(choice) = parse_menu_choice(&line, min, max) {
                return Ok(Some(choice));
            }
            writeln!(self.output, "Invalid input")?;
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    #[cfg(feature = "console")]
    fn colorize(&self, entry: &str) -> String {
        if !self.use_colors {
            return entry.to_string();
        }
        for level in LogLevel::ALL {
            let tag = format!("[{}]", level.to_str());
            if entry.contains(&tag) {
                let colored_tag = tag.as_str().color(level.color_code()).to_string();
                return entry.replacen(&tag, &colored_tag, 1);
            }
        }
        entry.to_string()
    }

    #[cfg(not(feature = "console"))]
    fn colorize(&self, entry: &str) -> String {
        entry.to_string()
    }
}
