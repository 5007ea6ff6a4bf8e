use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDateTime};
use thiserror::Error;

/// Wall-clock time captured once per job.
pub type Timestamp = NaiveDateTime;

/// Errors raised by [`Clock::format_time`].
/// （日期格式化失敗時的錯誤。）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFormatError {
    #[error("failed to format date template '{0}'")]
    Format(String),
}

/// Time source and `strftime`-style formatter.
/// （時間來源與 `strftime` 風格的格式化器。）
pub trait Clock {
    fn now(&self) -> Timestamp;

    fn format_time(&self, template: &str, timestamp: &Timestamp) -> Result<String, TimeFormatError> {
        strftime(template, timestamp)
    }
}

/// Longest directive chrono accepts after the `%`, e.g. `%::z` or `%.3f`.
const MAX_DIRECTIVE_CHARS: usize = 4;

/// Formats `timestamp` with `strftime` directives, one directive at a time.
///
/// A `%` that does not start a known directive is copied through, so `50% off`
/// stays intact. A directive that cannot be formatted for a local timestamp
/// (`%z`) is dropped on its own and logged.
pub fn strftime(template: &str, timestamp: &Timestamp) -> Result<String, TimeFormatError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(found) = rest.find('%') {
        output.push_str(&rest[..found]);
        let tail = &rest[found..];
        match directive_len(tail) {
            Some(len) => {
                let directive = &tail[..len];
                let mut formatted = String::new();
                match write!(
                    formatted,
                    "{}",
                    timestamp.format_with_items(StrftimeItems::new(directive))
                ) {
                    Ok(()) => output.push_str(&formatted),
                    Err(_) => log::warn!("dropping date directive '{directive}' from '{template}'"),
                }
                rest = &tail[len..];
            }
            None => {
                output.push('%');
                rest = &tail[1..];
            }
        }
    }
    output.push_str(rest);
    Ok(output)
}

/// Byte length of the shortest valid directive at the start of `tail`.
fn directive_len(tail: &str) -> Option<usize> {
    tail.char_indices()
        .skip(1)
        .take(MAX_DIRECTIVE_CHARS)
        .map(|(idx, ch)| idx + ch.len_utf8())
        .take_while(|&end| end == 2 || !tail[1..end].contains('%'))
        .find(|&end| {
            let mut items = StrftimeItems::new(&tail[..end]).peekable();
            items.peek().is_some() && items.all(|item| !matches!(item, Item::Error))
        })
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().naive_local()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
