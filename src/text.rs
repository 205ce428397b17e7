use std::io::{self, Write};
use std::iter::Peekable;
use std::str::Chars;

use regex::{Captures, Regex, RegexBuilder};

use super::{Error, Result};

/// A value substituted for one printf-style conversion in [`sprintf`].
#[derive(Clone, Debug, PartialEq)]
pub enum FmtArg {
    Int(isize),
    Float(f64),
    Str(String),
}

impl FmtArg {
    fn int(&self) -> isize {
        match self {
            Self::Int(v) => *v,
            Self::Float(v) => *v as isize,
            Self::Str(text) => panic!("expected a number, found {:?}", text),
        }
    }

    fn float(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Str(text) => panic!("expected a number, found {:?}", text),
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Str(text) => text.clone(),
        }
    }
}

impl From<isize> for FmtArg {
    fn from(v: isize) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FmtArg {
    fn from(v: i32) -> Self {
        Self::Int(v as isize)
    }
}

impl From<usize> for FmtArg {
    fn from(v: usize) -> Self {
        Self::Int(v as isize)
    }
}

impl From<f64> for FmtArg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FmtArg {
    fn from(text: &str) -> Self {
        Self::Str(text.to_string())
    }
}

impl From<String> for FmtArg {
    fn from(text: String) -> Self {
        Self::Str(text)
    }
}

/// Render a printf-style format string.
///
/// Supported conversions are `%d %i %u %f %e %E %g %G %s %c %x %X %o %%`,
/// with the optional `-`, `+`, `0` and space flags, a field width, and a
/// precision.
///
/// ```
/// use marray::sprintf;
///
/// assert_eq!(sprintf("%d-%d\n", &[3.into(), 4.into()]), "3-4\n");
/// ```
///
/// Panics: on an unsupported or truncated conversion, or when `args` runs
/// out before the conversions do.
pub fn sprintf(format: &str, args: &[FmtArg]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let spec = Spec::parse(&mut chars, format);
        let arg = args
            .next()
            .unwrap_or_else(|| panic!("not enough arguments for format {:?}", format));
        out.push_str(&spec.render(arg, format));
    }

    out
}

/// Print formatted text to standard output.
///
/// The source overload taking a file handle as the first argument is
/// [`fprintf_fid`].
pub fn fprintf(format: &str, args: &[FmtArg]) {
    print!("{}", sprintf(format, args));
    let _ = io::stdout().flush();
}

/// Write formatted text to an open file handle (or any other writer).
pub fn fprintf_fid<W: Write>(fid: &mut W, format: &str, args: &[FmtArg]) -> Result<()> {
    fid.write_all(sprintf(format, args).as_bytes())?;
    Ok(())
}

/// One parsed `%` conversion specification.
struct Spec {
    minus: bool,
    plus: bool,
    zero: bool,
    space: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

impl Spec {
    fn parse(chars: &mut Peekable<Chars>, format: &str) -> Self {
        let mut spec = Self {
            minus: false,
            plus: false,
            zero: false,
            space: false,
            width: 0,
            precision: None,
            conversion: '\0',
        };

        loop {
            match chars.peek() {
                Some('-') => spec.minus = true,
                Some('+') => spec.plus = true,
                Some('0') => spec.zero = true,
                Some(' ') => spec.space = true,
                _ => break,
            }
            chars.next();
        }

        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            spec.width = spec.width * 10 + digit as usize;
            chars.next();
        }

        if chars.peek() == Some(&'.') {
            chars.next();
            let mut precision = 0;
            while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                precision = precision * 10 + digit as usize;
                chars.next();
            }
            spec.precision = Some(precision);
        }

        spec.conversion = chars
            .next()
            .unwrap_or_else(|| panic!("truncated conversion in format {:?}", format));

        spec
    }

    fn render(&self, arg: &FmtArg, format: &str) -> String {
        match self.conversion {
            'd' | 'i' | 'u' => {
                let v = arg.int();
                self.pad_number(self.int_digits(v.unsigned_abs().to_string()), v < 0)
            }
            'x' => {
                let v = arg.int();
                self.pad_number(self.int_digits(format!("{:x}", v.unsigned_abs())), v < 0)
            }
            'X' => {
                let v = arg.int();
                self.pad_number(self.int_digits(format!("{:X}", v.unsigned_abs())), v < 0)
            }
            'o' => {
                let v = arg.int();
                self.pad_number(self.int_digits(format!("{:o}", v.unsigned_abs())), v < 0)
            }
            'f' => {
                let v = arg.float();
                let body = format!("{:.*}", self.precision.unwrap_or(6), v.abs());
                self.pad_number(body, v.is_sign_negative())
            }
            'e' | 'E' => {
                let v = arg.float();
                let body = exponential(
                    v.abs(),
                    self.precision.unwrap_or(6),
                    self.conversion == 'E',
                );
                self.pad_number(body, v.is_sign_negative())
            }
            'g' | 'G' => {
                let v = arg.float();
                let body = general(
                    v.abs(),
                    self.precision.unwrap_or(6).max(1),
                    self.conversion == 'G',
                );
                self.pad_number(body, v.is_sign_negative())
            }
            's' => {
                let body = match self.precision {
                    Some(precision) => arg.text().chars().take(precision).collect(),
                    None => arg.text(),
                };
                self.pad_text(body)
            }
            'c' => {
                let body = match arg {
                    FmtArg::Int(v) => char::from_u32(*v as u32)
                        .unwrap_or_else(|| panic!("invalid character code {}", v))
                        .to_string(),
                    FmtArg::Str(text) => text.chars().take(1).collect(),
                    FmtArg::Float(v) => panic!("expected a character, found {}", v),
                };
                self.pad_text(body)
            }
            other => panic!("unsupported conversion %{} in format {:?}", other, format),
        }
    }

    // a precision on an integer conversion means a minimum digit count
    fn int_digits(&self, digits: String) -> String {
        match self.precision {
            Some(precision) if digits.len() < precision => {
                format!("{}{}", "0".repeat(precision - digits.len()), digits)
            }
            _ => digits,
        }
    }

    fn pad_number(&self, digits: String, negative: bool) -> String {
        let sign = if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        };

        let len = sign.len() + digits.len();
        if len >= self.width {
            format!("{}{}", sign, digits)
        } else if self.minus {
            format!("{}{}{}", sign, digits, " ".repeat(self.width - len))
        } else if self.zero {
            format!("{}{}{}", sign, "0".repeat(self.width - len), digits)
        } else {
            format!("{}{}{}", " ".repeat(self.width - len), sign, digits)
        }
    }

    fn pad_text(&self, body: String) -> String {
        if body.len() >= self.width {
            body
        } else if self.minus {
            format!("{}{}", body, " ".repeat(self.width - body.len()))
        } else {
            format!("{}{}", " ".repeat(self.width - body.len()), body)
        }
    }
}

// C-style exponent rendering: a sign and at least two digits
fn exponential(v: f64, precision: usize, upper: bool) -> String {
    let body = format!("{:.*e}", precision, v);
    let (mantissa, exponent) = body.split_once('e').expect("exponent");
    let exponent: i32 = exponent.parse().expect("exponent");
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

fn general(v: f64, precision: usize, upper: bool) -> String {
    let exponent = if v == 0. {
        0
    } else {
        v.log10().floor() as i32
    };

    if exponent < -4 || exponent >= precision as i32 {
        let body = exponential(v, precision - 1, upper);
        let e = if upper { 'E' } else { 'e' };
        let (mantissa, suffix) = body.split_once(e).expect("exponent");
        format!("{}{}{}", trim_zeros(mantissa), e, suffix)
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, v))
    }
}

fn trim_zeros(body: &str) -> String {
    if body.contains('.') {
        body.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        body.to_string()
    }
}

/// Search `text` for the first match of `pattern`.
///
/// The source convention's named-group syntax `(?<name>...)` is rewritten
/// into the host spelling before compiling. No match is `Ok(None)`; an
/// invalid pattern is a recoverable error.
pub fn regexp<'t>(text: &'t str, pattern: &str) -> Result<Option<Captures<'t>>> {
    let re = Regex::new(&named_groups(pattern)).map_err(Error::msg)?;
    Ok(re.captures(text))
}

/// Case-insensitive [`regexp`].
pub fn regexpi<'t>(text: &'t str, pattern: &str) -> Result<Option<Captures<'t>>> {
    let re = RegexBuilder::new(&named_groups(pattern))
        .case_insensitive(true)
        .build()
        .map_err(Error::msg)?;

    Ok(re.captures(text))
}

/// Replace every match of `pattern` in `text`, rewriting `$1`-style
/// backreferences in `replacement` into the host spelling first.
pub fn regexprep(text: &str, pattern: &str, replacement: &str) -> Result<String> {
    let re = Regex::new(&named_groups(pattern)).map_err(Error::msg)?;
    let replacement = backrefs(replacement);
    Ok(re.replace_all(text, replacement.as_str()).into_owned())
}

/// Element-wise [`regexprep`] over a list of strings.
pub fn regexprep_each(texts: &[&str], pattern: &str, replacement: &str) -> Result<Vec<String>> {
    let re = Regex::new(&named_groups(pattern)).map_err(Error::msg)?;
    let replacement = backrefs(replacement);

    Ok(texts
        .iter()
        .map(|text| re.replace_all(text, replacement.as_str()).into_owned())
        .collect())
}

fn named_groups(pattern: &str) -> String {
    pattern.replace("(?<", "(?P<")
}

// brace each single-digit group number so a following literal digit
// cannot extend it
fn backrefs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            if let Some(digit) = chars.peek().copied().filter(|d| d.is_ascii_digit()) {
                chars.next();
                out.push_str(&format!("${{{}}}", digit));
                continue;
            }
        }
        out.push(c);
    }

    out
}
