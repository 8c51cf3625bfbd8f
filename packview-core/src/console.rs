//! Console command interpreter
//!
//! Line-based commands read from the debug UART:
//!
//! | Command                      | Effect                                  |
//! |------------------------------|-----------------------------------------|
//! | `config`                     | print mode, SSID and password           |
//! | `config ssid <value>`        | store SSID, then print                  |
//! | `config pwd <value>`         | store password, then print              |
//! | `config mode <auto/ap/client>` | store connection mode, then print     |
//! | `config broker <address>`    | store broker address, then print        |
//! | `status`                     | serial number, broker and counters      |
//! | `pub <topic> <payload>`      | inject a publish into the label board   |
//! | `help`                       | list commands                           |

use core::fmt::Write;

use packview_hal::FlashStorage;

use crate::settings::{ConnectionMode, Settings, SettingsError};
use crate::telemetry::TelemetryBoard;
use crate::topic::{self, TopicError};

/// Parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    ShowConfig,
    SetSsid(&'a str),
    SetPassword(&'a str),
    SetMode(ConnectionMode),
    SetBroker(&'a str),
    Status,
    Publish { topic: &'a str, payload: &'a str },
}

/// Console failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// Blank line
    Empty,
    /// First word is not a command
    UnknownCommand,
    /// `config` key not recognized
    UnknownSetting,
    /// Required argument missing
    MissingArgument,
    /// Mode is not auto/ap/client/0/1/2
    InvalidMode,
    /// Settings access failed
    Settings(SettingsError),
    /// Publish topic rejected
    Topic(TopicError),
    /// Output sink failed
    Output,
}

impl ConsoleError {
    /// One-line diagnostic
    pub fn message(self) -> &'static str {
        match self {
            ConsoleError::Empty => "empty command",
            ConsoleError::UnknownCommand => "unknown command, try 'help'",
            ConsoleError::UnknownSetting => "unknown setting, expected ssid, pwd, mode or broker",
            ConsoleError::MissingArgument => "missing argument",
            ConsoleError::InvalidMode => "mode must be auto, ap or client",
            ConsoleError::Settings(SettingsError::TooLong) => "value too long",
            ConsoleError::Settings(SettingsError::Corrupted) => "stored value corrupted",
            ConsoleError::Settings(SettingsError::Storage(_)) => "storage error",
            ConsoleError::Topic(_) => "invalid topic",
            ConsoleError::Output => "output error",
        }
    }
}

impl From<SettingsError> for ConsoleError {
    fn from(err: SettingsError) -> Self {
        ConsoleError::Settings(err)
    }
}

impl From<TopicError> for ConsoleError {
    fn from(err: TopicError) -> Self {
        ConsoleError::Topic(err)
    }
}

impl From<core::fmt::Error> for ConsoleError {
    fn from(_: core::fmt::Error) -> Self {
        ConsoleError::Output
    }
}

/// Split off the first whitespace-separated word
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

/// Parse one input line
pub fn parse(line: &str) -> Result<Command<'_>, ConsoleError> {
    let (word, rest) = split_word(line.trim());
    match word {
        "" => Err(ConsoleError::Empty),
        "help" => Ok(Command::Help),
        "status" => Ok(Command::Status),
        "config" => parse_config(rest),
        "pub" => {
            let (topic, payload) = split_word(rest);
            if topic.is_empty() {
                return Err(ConsoleError::MissingArgument);
            }
            topic::validate_topic(topic)?;
            Ok(Command::Publish { topic, payload })
        }
        _ => Err(ConsoleError::UnknownCommand),
    }
}

fn parse_config(args: &str) -> Result<Command<'_>, ConsoleError> {
    if args.is_empty() {
        return Ok(Command::ShowConfig);
    }

    let (key, value) = split_word(args);
    let value = value.trim_end();
    if value.is_empty() {
        return Err(ConsoleError::MissingArgument);
    }

    match key {
        "ssid" => Ok(Command::SetSsid(value)),
        "pwd" | "password" => Ok(Command::SetPassword(value)),
        "mode" => ConnectionMode::parse(value)
            .map(Command::SetMode)
            .ok_or(ConsoleError::InvalidMode),
        "broker" => Ok(Command::SetBroker(value)),
        _ => Err(ConsoleError::UnknownSetting),
    }
}

/// Parse and run one line, writing a diagnostic on failure
pub async fn run_line<S, W>(
    line: &str,
    settings: &mut Settings<S>,
    board: &mut TelemetryBoard,
    out: &mut W,
) -> Result<(), ConsoleError>
where
    S: FlashStorage,
    W: Write,
{
    let result = match parse(line) {
        Ok(command) => execute(command, settings, board, out).await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        writeln!(out, "error: {}", err.message())?;
    }
    result
}

/// Run a parsed command
pub async fn execute<S, W>(
    command: Command<'_>,
    settings: &mut Settings<S>,
    board: &mut TelemetryBoard,
    out: &mut W,
) -> Result<(), ConsoleError>
where
    S: FlashStorage,
    W: Write,
{
    match command {
        Command::Help => {
            writeln!(out, "config [ssid|pwd|mode|broker <value>]")?;
            writeln!(out, "status")?;
            writeln!(out, "pub <topic> <payload>")?;
        }
        Command::ShowConfig => show_config(settings, out).await?,
        Command::SetSsid(ssid) => {
            settings.writer()?.set_ssid(ssid).await?;
            show_config(settings, out).await?;
        }
        Command::SetPassword(password) => {
            settings.writer()?.set_password(password).await?;
            show_config(settings, out).await?;
        }
        Command::SetMode(mode) => {
            settings.writer()?.set_connection_mode(mode).await?;
            show_config(settings, out).await?;
        }
        Command::SetBroker(broker) => {
            settings.writer()?.set_broker(broker).await?;
            show_config(settings, out).await?;
        }
        Command::Status => {
            let mut reader = settings.reader()?;
            let serial = reader.serial_number().await?;
            let broker = reader.broker().await?;
            writeln!(out, "serial: {}", serial.as_deref().unwrap_or("<unset>"))?;
            writeln!(out, "broker: {}", broker.as_deref().unwrap_or("<unset>"))?;
            writeln!(out, "boots: {}", reader.boot_count().await?)?;
            writeln!(out, "logs: {}", reader.log_count().await?)?;
        }
        Command::Publish { topic, payload } => {
            let changed = board.publish(topic, payload.as_bytes());
            writeln!(out, "{} label(s) updated", changed)?;
        }
    }
    Ok(())
}

async fn show_config<S, W>(settings: &mut Settings<S>, out: &mut W) -> Result<(), ConsoleError>
where
    S: FlashStorage,
    W: Write,
{
    let mut reader = settings.reader()?;
    let mode = reader.connection_mode().await?;
    let ssid = reader.ssid().await?;
    let password = reader.password().await?;

    writeln!(out, "mode: {}", mode.name())?;
    writeln!(out, "ssid: {}", ssid.as_deref().unwrap_or("<unset>"))?;
    writeln!(out, "pwd: {}", password.as_deref().unwrap_or("<unset>"))?;
    Ok(())
}
