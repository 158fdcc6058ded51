//! Operator credentials: alert recipient, Twilio account SID and auth token.
//!
//! Each value has a fixed format. Values that arrive from the environment or
//! the command line are checked first; anything missing or malformed is asked
//! for on the terminal until it passes.

use std::fmt;
use std::io::{BufRead, Write};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

const ACCOUNT_SID_PREFIX: &str = "AC";
const ACCOUNT_SID_LEN: usize = 34;

fn recipient_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("recipient pattern is valid"))
}

fn auth_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]{32}$").expect("auth token pattern is valid"))
}

/// Alert destination in international format, e.g. `+5511999999999`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient(String);

impl Recipient {
    pub const HINT: &'static str =
        "The recipient must be in international format starting with '+', e.g. +5511999999999";

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if recipient_pattern().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::config(Self::HINT))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Twilio account SID: `AC` followed by 32 more characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSid(String);

impl AccountSid {
    pub const HINT: &'static str = "The Twilio account SID must start with 'AC' and be 34 characters long";

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.starts_with(ACCOUNT_SID_PREFIX) && raw.len() == ACCOUNT_SID_LEN {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::config(Self::HINT))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Twilio auth token: exactly 32 alphanumeric characters. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub const HINT: &'static str = "The Twilio auth token must be 32 alphanumeric characters";

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if auth_token_pattern().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::config(Self::HINT))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Unvalidated credential values as found in env / CLI.
#[derive(Clone, Default)]
pub struct RawCredentials {
    pub recipient: Option<String>,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
}

impl fmt::Debug for RawCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCredentials")
            .field("recipient", &self.recipient)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub recipient: Recipient,
    pub account_sid: AccountSid,
    pub auth_token: AuthToken,
}

impl Credentials {
    /// Validate without prompting. Fails on the first missing or bad value.
    pub fn from_raw(raw: &RawCredentials) -> Result<Self, AppError> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| AppError::config(format!("{} is required", name)))
        };

        Ok(Self {
            recipient: Recipient::parse(&required(&raw.recipient, "WATCHDOG_RECIPIENT")?)?,
            account_sid: AccountSid::parse(&required(&raw.account_sid, "TWILIO_ACCOUNT_SID")?)?,
            auth_token: AuthToken::parse(&required(&raw.auth_token, "TWILIO_AUTH_TOKEN")?)?,
        })
    }
}

/// Resolve all three credentials, prompting on `input`/`output` for any
/// value that is missing or fails validation.
///
/// Prompts repeat until the entered value is valid. Closing the input
/// before every value is valid is a configuration error.
pub fn resolve_credentials<R, W>(
    raw: &RawCredentials,
    input: &mut R,
    output: &mut W,
) -> Result<Credentials, AppError>
where
    R: BufRead,
    W: Write,
{
    let recipient = resolve_field(
        raw.recipient.as_deref(),
        "Alert recipient (e.g. +5511999999999): ",
        Recipient::parse,
        input,
        output,
    )?;
    let account_sid = resolve_field(
        raw.account_sid.as_deref(),
        "Twilio account SID: ",
        AccountSid::parse,
        input,
        output,
    )?;
    let auth_token = resolve_field(
        raw.auth_token.as_deref(),
        "Twilio auth token: ",
        AuthToken::parse,
        input,
        output,
    )?;

    tracing::info!("Credentials accepted");

    Ok(Credentials {
        recipient,
        account_sid,
        auth_token,
    })
}

fn resolve_field<T, R, W>(
    preset: Option<&str>,
    prompt: &str,
    parse: fn(&str) -> Result<T, AppError>,
    input: &mut R,
    output: &mut W,
) -> Result<T, AppError>
where
    R: BufRead,
    W: Write,
{
    if let Some(value) = preset {
        match parse(value) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => writeln!(output, "[ERROR] {}", err)?,
        }
    }

    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(AppError::config(format!(
                "input closed before a valid value was entered for: {}",
                prompt.trim_end_matches([':', ' '])
            )));
        }

        match parse(&line) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => writeln!(output, "[ERROR] {}", err)?,
        }
    }
}
