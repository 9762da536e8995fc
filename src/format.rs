//! `printf`-style positional substitution for message templates.
//!
//! Grammar of a placeholder:
//!
//! ```text
//! %[argument_index$][flags][width][.precision]conversion
//! ```
//!
//! Ordinary placeholders consume arguments left to right. `%2$s` addresses an
//! argument explicitly (1-based) without moving the sequential cursor, and
//! `%<s` reuses the previously formatted argument. Surplus arguments are ignored.

use std::fmt;
use std::num::FpCategory;

use thiserror::Error;

/// A value substituted into a template placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageArg {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

impl MessageArg {
    /// Name used in conversion error messages.
    const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for MessageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&float_to_string(*value)),
            Self::Char(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<&str> for MessageArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MessageArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for MessageArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for MessageArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for MessageArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for MessageArg {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f32> for MessageArg {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for MessageArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<char> for MessageArg {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for MessageArg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Plain-decimal range of `%s` floats; outside it they print in `E` notation.
const PLAIN_FLOAT_MIN: f64 = 1e-3;
const PLAIN_FLOAT_MAX: f64 = 1e7;

/// Largest width or precision a placeholder may request.
pub const MAX_WIDTH: usize = 65_535;

/// Errors raised while substituting arguments into a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Format specifier '{specifier}' has no matching argument")]
    MissingArgument { specifier: String },

    #[error("Unknown format conversion '{0}'")]
    UnknownConversion(char),

    #[error("Incomplete format specifier '{0}' at end of template")]
    IncompleteSpecifier(String),

    #[error("Invalid argument index in '{0}'")]
    InvalidArgumentIndex(String),

    #[error("Conversion '%{conversion}' cannot format a {argument} argument")]
    IllegalConversion { conversion: char, argument: &'static str },

    #[error("Format specifier '{0}' requires a width")]
    MissingWidth(String),

    #[error("Format specifier '{0}' combines incompatible flags")]
    IllegalFlags(String),

    #[error("Conversion '%{0}' does not accept a precision")]
    IllegalPrecision(char),

    #[error("Width in format specifier '{0}' exceeds 65535")]
    IllegalWidth(String),

    #[error("Precision in format specifier '{0}' exceeds 65535")]
    PrecisionTooLarge(String),
}

/// Substitutes `args` into `template`.
///
/// # Examples
/// ```
/// use db_message_source::format::{format_template, MessageArg};
///
/// let text = format_template("%s has %d new messages", &["Ala".into(), 3.into()]).unwrap();
/// assert_eq!(text, "Ala has 3 new messages");
/// ```
pub fn format_template(template: &str, args: &[MessageArg]) -> Result<String, FormatError> {
    if !template.contains('%') {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut cursor = Cursor { src: template, pos: 0 };
    let mut next_arg = 0usize;
    let mut last_arg: Option<usize> = None;

    while let Some(c) = cursor.bump() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let start = cursor.pos - 1;
        let spec = Spec::parse(&mut cursor, start)?;

        match spec.conversion {
            '%' => {
                out.push_str(&pad(&spec, "", "%".to_string()));
                continue;
            }
            'n' => {
                out.push('\n');
                continue;
            }
            _ => {}
        }

        let slot = match spec.index {
            ArgIndex::Next => {
                let slot = next_arg;
                next_arg += 1;
                Some(slot)
            }
            ArgIndex::Explicit(slot) => Some(slot),
            ArgIndex::Previous => last_arg,
        };
        let arg = slot
            .and_then(|slot| args.get(slot))
            .ok_or_else(|| FormatError::MissingArgument { specifier: spec.text.clone() })?;
        last_arg = slot;

        out.push_str(&spec.render(arg)?);
    }

    Ok(out)
}

/// Read position inside a template.
struct Cursor<'a> {
    /// Whole template.
    src: &'a str,
    /// Byte offset of the next unread char.
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes a run of ASCII digits.
    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.src.get(start..self.pos).unwrap_or_default()
    }

    fn text_from(&self, start: usize) -> String {
        self.src.get(start..self.pos).unwrap_or_default().to_string()
    }
}

/// Which argument a placeholder reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgIndex {
    Next,
    /// Zero-based slot (the template uses one-based `n$`).
    Explicit(usize),
    Previous,
}

#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    group: bool,
    alternate: bool,
}

/// One parsed placeholder.
#[derive(Debug, Clone)]
struct Spec {
    /// Placeholder as written, for error messages.
    text: String,
    index: ArgIndex,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    /// Lower-cased conversion character.
    conversion: char,
    /// Upper-case variant (`%S`, `%X`, ...).
    upper: bool,
}

impl Spec {
    fn parse(cursor: &mut Cursor<'_>, start: usize) -> Result<Self, FormatError> {
        let mut index = ArgIndex::Next;

        let checkpoint = cursor.pos;
        let digits = cursor.digits().to_string();
        if !digits.is_empty() && cursor.peek() == Some('$') {
            cursor.bump();
            let position: usize = digits
                .parse()
                .map_err(|_| FormatError::InvalidArgumentIndex(cursor.text_from(start)))?;
            let slot = position
                .checked_sub(1)
                .ok_or_else(|| FormatError::InvalidArgumentIndex(cursor.text_from(start)))?;
            index = ArgIndex::Explicit(slot);
        } else {
            cursor.pos = checkpoint;
        }

        let mut flags = Flags::default();
        while let Some(c) = cursor.peek() {
            match c {
                '-' => flags.left = true,
                '+' => flags.plus = true,
                ' ' => flags.space = true,
                '0' => flags.zero = true,
                ',' => flags.group = true,
                '#' => flags.alternate = true,
                '<' => index = ArgIndex::Previous,
                _ => break,
            }
            cursor.bump();
        }

        let width = parse_bounded(cursor.digits(), cursor, start, FormatError::IllegalWidth)?;

        let precision = if cursor.peek() == Some('.') {
            cursor.bump();
            let digits = cursor.digits().to_string();
            if digits.is_empty() {
                return Err(FormatError::UnknownConversion('.'));
            }
            parse_bounded(&digits, cursor, start, FormatError::PrecisionTooLarge)?
        } else {
            None
        };

        let Some(raw) = cursor.bump() else {
            return Err(FormatError::IncompleteSpecifier(cursor.text_from(start)));
        };

        let spec = Self {
            text: cursor.text_from(start),
            index,
            flags,
            width,
            precision,
            conversion: raw.to_ascii_lowercase(),
            upper: raw.is_ascii_uppercase(),
        };
        spec.check()?;
        Ok(spec)
    }

    /// Rejects flag, width and precision combinations that have no meaning.
    fn check(&self) -> Result<(), FormatError> {
        if !matches!(self.conversion, 's' | 'd' | 'f' | 'e' | 'x' | 'o' | 'c' | 'b' | '%' | 'n')
            || (self.upper && matches!(self.conversion, 'd' | 'f' | 'o' | 'n'))
        {
            let raw = if self.upper { self.conversion.to_ascii_uppercase() } else { self.conversion };
            return Err(FormatError::UnknownConversion(raw));
        }

        if (self.flags.left || self.flags.zero) && self.width.is_none() {
            return Err(FormatError::MissingWidth(self.text.clone()));
        }
        if (self.flags.left && self.flags.zero) || (self.flags.plus && self.flags.space) {
            return Err(FormatError::IllegalFlags(self.text.clone()));
        }
        if self.flags.zero && !self.is_numeric() {
            return Err(FormatError::IllegalFlags(self.text.clone()));
        }

        if self.precision.is_some() && matches!(self.conversion, 'd' | 'x' | 'o' | 'c' | '%' | 'n')
        {
            return Err(FormatError::IllegalPrecision(self.conversion));
        }

        Ok(())
    }

    const fn is_numeric(&self) -> bool {
        matches!(self.conversion, 'd' | 'f' | 'e' | 'x' | 'o')
    }

    fn render(&self, arg: &MessageArg) -> Result<String, FormatError> {
        let rendered = match (self.conversion, arg) {
            ('b', MessageArg::Bool(value)) => pad(self, "", value.to_string()),
            ('b', MessageArg::Null) => pad(self, "", "false".to_string()),
            ('b', _) => pad(self, "", "true".to_string()),
            (_, MessageArg::Null) => pad(self, "", "null".to_string()),
            ('s', _) => {
                let text = arg.to_string();
                let text = match self.precision {
                    Some(precision) => text.chars().take(precision).collect(),
                    None => text,
                };
                pad(self, "", text)
            }
            ('c', MessageArg::Char(value)) => pad(self, "", value.to_string()),
            ('c', MessageArg::Int(value)) => {
                let c = u32::try_from(*value).ok().and_then(char::from_u32).ok_or(
                    FormatError::IllegalConversion { conversion: 'c', argument: "integer" },
                )?;
                pad(self, "", c.to_string())
            }
            ('d', MessageArg::Int(value)) => {
                let digits = value.unsigned_abs().to_string();
                let digits = if self.flags.group { group_digits(&digits) } else { digits };
                pad(self, self.sign(value.is_negative()), digits)
            }
            ('x', MessageArg::Int(value)) => {
                let prefix = if self.flags.alternate { "0x" } else { "" };
                pad(self, prefix, format!("{:x}", u64::from_ne_bytes(value.to_ne_bytes())))
            }
            ('o', MessageArg::Int(value)) => {
                let prefix = if self.flags.alternate { "0" } else { "" };
                pad(self, prefix, format!("{:o}", u64::from_ne_bytes(value.to_ne_bytes())))
            }
            ('f' | 'e', MessageArg::Float(value)) => self.render_float(*value),
            (conversion, other) => {
                return Err(FormatError::IllegalConversion { conversion, argument: other.kind() });
            }
        };

        Ok(if self.upper { rendered.to_uppercase() } else { rendered })
    }

    fn render_float(&self, value: f64) -> String {
        if value.is_nan() {
            return pad_plain(self, "NaN".to_string());
        }
        let sign = self.sign(value.is_sign_negative());
        if value.is_infinite() {
            return pad_plain(self, format!("{sign}Infinity"));
        }

        let precision = self.precision.unwrap_or(6);
        let magnitude = value.abs();
        let body = if self.conversion == 'e' {
            scientific(magnitude, precision)
        } else {
            let fixed = format!("{magnitude:.precision$}");
            if self.flags.group { group_fixed(&fixed) } else { fixed }
        };
        pad(self, sign, body)
    }

    const fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        }
    }
}

/// Width or precision digits, at most [`MAX_WIDTH`].
fn parse_bounded(
    digits: &str,
    cursor: &Cursor<'_>,
    start: usize,
    out_of_range: fn(String) -> FormatError,
) -> Result<Option<usize>, FormatError> {
    if digits.is_empty() {
        return Ok(None);
    }
    match digits.parse::<usize>() {
        Ok(value) if value <= MAX_WIDTH => Ok(Some(value)),
        _ => Err(out_of_range(cursor.text_from(start))),
    }
}

/// Applies width, justification and zero padding.
///
/// `lead` (sign or radix prefix) stays in front of any zero padding.
fn pad(spec: &Spec, lead: &str, body: String) -> String {
    let len = lead.chars().count() + body.chars().count();
    let Some(width) = spec.width.filter(|width| *width > len) else {
        return format!("{lead}{body}");
    };
    let fill = width - len;

    if spec.flags.left {
        format!("{lead}{body}{}", " ".repeat(fill))
    } else if spec.flags.zero {
        format!("{lead}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{lead}{body}", " ".repeat(fill))
    }
}

/// Padding without zero fill, for `NaN` and infinities.
fn pad_plain(spec: &Spec, body: String) -> String {
    let plain = Spec { flags: Flags { zero: false, ..spec.flags }, ..spec.clone() };
    pad(&plain, "", body)
}

/// Inserts `,` every three digits from the right.
fn group_digits(digits: &str) -> String {
    let count = digits.len();
    let mut out = String::with_capacity(count + count / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn group_fixed(fixed: &str) -> String {
    match fixed.split_once('.') {
        Some((integer, fraction)) => format!("{}.{fraction}", group_digits(integer)),
        None => group_digits(fixed),
    }
}

/// `1.234560e+03` style, exponent signed and at least two digits.
fn scientific(magnitude: f64, precision: usize) -> String {
    let raw = format!("{magnitude:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = exponent.strip_prefix('-').map_or(("+", exponent), |d| ("-", d));
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Renders a float for `%s` like `Double.toString`.
///
/// Magnitudes in `[1e-3, 1e7)` (and zero) print as plain decimals with at least
/// one fraction digit; anything else prints as `1.0E20` / `1.5E-7`.
fn float_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-Infinity" } else { "Infinity" }.to_string();
    }

    let magnitude = value.abs();
    let zero = matches!(value.classify(), FpCategory::Zero);
    if zero || (PLAIN_FLOAT_MIN..PLAIN_FLOAT_MAX).contains(&magnitude) {
        let mut text = value.to_string();
        if !text.contains('.') {
            text.push_str(".0");
        }
        return text;
    }

    let raw = format!("{value:e}");
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{mantissa}E{exponent}")
    } else {
        format!("{mantissa}.0E{exponent}")
    }
}
