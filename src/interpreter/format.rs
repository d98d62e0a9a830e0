//! Output formatting
//!
//! Turns evaluated output arguments into the text of one Result event:
//! - [`format_printf`]: C `printf` conversions, consumed positionally
//! - [`render_print`]: `print(a, b)` / `console.log(a, b)`, space-joined
//! - [`render_template`]: f-strings and template literals
//!
//! An argument that could not be resolved is passed as `None` and prints as
//! `NULL`. Escapes in literal text are still raw when they reach this module
//! (see [`unescape`]).

use crate::memory::value::Value;
use crate::parser::ast::{Dialect, TemplatePart};

/// Placeholder printed for an argument that names no variable
pub const UNRESOLVED: &str = "NULL";

/// Resolve backslash escapes in literal text
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(c @ ('\\' | '"' | '\'' | '`' | '$')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Text of a value as `print`/`console.log` show it
pub fn render_value(value: &Value, dialect: Dialect) -> String {
    match (value, dialect) {
        (Value::Bool(b), Dialect::Python) => (if *b { "True" } else { "False" }).to_string(),
        (Value::Bool(b), Dialect::C) => (*b as i64).to_string(),
        (Value::Float(x), Dialect::Python) if x.is_finite() && x.fract() == 0.0 => {
            format!("{:.1}", x)
        }
        (other, _) => other.to_string(),
    }
}

fn render_arg(arg: &Option<Value>, dialect: Dialect) -> String {
    arg.as_ref()
        .map_or_else(|| UNRESOLVED.to_string(), |v| render_value(v, dialect))
}

/// `print(a, b)`: arguments separated by single spaces
pub fn render_print(args: &[Option<Value>], dialect: Dialect) -> String {
    args.iter()
        .map(|arg| render_arg(arg, dialect))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Interpolate template parts; `values` holds one entry per `Expr` part, in order
pub fn render_template(parts: &[TemplatePart], values: &[Option<Value>], dialect: Dialect) -> String {
    let mut values = values.iter();
    let mut out = String::new();
    for part in parts {
        match part {
            TemplatePart::Text(text) => out.push_str(&unescape(text)),
            TemplatePart::Expr(_) => {
                if let Some(arg) = values.next() {
                    out.push_str(&render_arg(arg, dialect));
                }
            }
        }
    }
    out
}

/// A parsed `%...` conversion
#[derive(Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: Option<usize>,
    precision: Option<usize>,
    long: bool,
    conversion: char,
}

const CONVERSIONS: &str = "diufFeEgGcsxXo";

/// Format a C `printf` call. `format` still carries raw escapes.
///
/// Each conversion consumes the next argument. Conversions left without an
/// argument are copied verbatim; surplus arguments are ignored.
pub fn format_printf(format: &str, args: &[Option<Value>]) -> String {
    let format = unescape(format);
    let mut output = String::new();
    let mut chars = format.chars().peekable();
    let mut args = args.iter();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            output.push(ch);
            continue;
        }

        let mut raw = String::from('%');
        let mut spec = Spec::default();

        while let Some(&c) = chars.peek() {
            match c {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                '#' => spec.alt = true,
                _ => break,
            }
            raw.push(c);
            chars.next();
        }

        spec.width = take_number(&mut chars, &mut raw);
        if chars.peek() == Some(&'.') {
            raw.push('.');
            chars.next();
            spec.precision = Some(take_number(&mut chars, &mut raw).unwrap_or(0));
        }
        while let Some(&c) = chars.peek() {
            if !matches!(c, 'l' | 'h' | 'z' | 'L') {
                break;
            }
            spec.long |= c == 'l' || c == 'L';
            raw.push(c);
            chars.next();
        }

        match chars.next() {
            Some('%') if raw == "%" => output.push('%'),
            Some(c) if CONVERSIONS.contains(c) => {
                raw.push(c);
                spec.conversion = c;
                match args.next() {
                    Some(Some(value)) => output.push_str(&format_conversion(&spec, value)),
                    Some(None) => output.push_str(&pad(UNRESOLVED.to_string(), &spec, false)),
                    None => output.push_str(&raw),
                }
            }
            Some(c) => {
                raw.push(c);
                output.push_str(&raw);
            }
            None => output.push_str(&raw),
        }
    }

    output
}

fn take_number(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    raw: &mut String,
) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    raw.push_str(&digits);
    digits.parse().ok()
}

fn format_conversion(spec: &Spec, value: &Value) -> String {
    // Text given to a numeric conversion prints as-is
    if let Value::Str(s) = value {
        if spec.conversion != 's' {
            return pad(s.clone(), spec, false);
        }
    }

    match spec.conversion {
        'd' | 'i' => {
            let n = value.to_int().unwrap_or_default();
            pad(signed(n.to_string(), n >= 0, spec), spec, true)
        }
        'u' | 'x' | 'X' | 'o' => {
            let n = value.to_int().unwrap_or_default();
            let n = if spec.long { n as u64 } else { n as u32 as u64 };
            let body = match spec.conversion {
                'u' => n.to_string(),
                'x' if spec.alt && n != 0 => format!("0x{:x}", n),
                'x' => format!("{:x}", n),
                'X' if spec.alt && n != 0 => format!("0X{:X}", n),
                'X' => format!("{:X}", n),
                _ if spec.alt => format!("0{:o}", n),
                _ => format!("{:o}", n),
            };
            pad(body, spec, true)
        }
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let x = value.to_float().unwrap_or_default();
            let body = if x.is_finite() {
                let precision = spec.precision.unwrap_or(6);
                match spec.conversion {
                    'f' | 'F' => format!("{:.*}", precision, x),
                    'e' => exponent_form(x, precision, false),
                    'E' => exponent_form(x, precision, true),
                    _ => general_form(x, precision, spec.alt, spec.conversion == 'G'),
                }
            } else if x.is_nan() {
                "nan".to_string()
            } else if x > 0.0 {
                "inf".to_string()
            } else {
                "-inf".to_string()
            };
            let nonnegative = !body.starts_with('-');
            pad(signed(body, nonnegative, spec), spec, x.is_finite())
        }
        'c' => {
            let ch = match value {
                Value::Char(c) => Some(*c),
                other => other
                    .to_int()
                    .and_then(|n| u32::try_from(n).ok())
                    .and_then(char::from_u32),
            };
            pad(ch.map_or_else(|| value.to_string(), String::from), spec, false)
        }
        _ => {
            let text = render_value(value, Dialect::C);
            let text = match spec.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            };
            pad(text, spec, false)
        }
    }
}

/// Apply the `+` / space flags to a non-negative number
fn signed(body: String, nonnegative: bool, spec: &Spec) -> String {
    match (nonnegative, spec.plus, spec.space) {
        (true, true, _) => format!("+{}", body),
        (true, false, true) => format!(" {}", body),
        _ => body,
    }
}

/// Pad to the field width; zeros go after the sign of numeric output
fn pad(body: String, spec: &Spec, numeric: bool) -> String {
    let len = body.chars().count();
    let Some(width) = spec.width.filter(|&w| w > len) else {
        return body;
    };
    let fill = width - len;

    if spec.left {
        format!("{}{}", body, " ".repeat(fill))
    } else if spec.zero && numeric {
        let sign_len = body
            .char_indices()
            .find(|&(_, c)| !matches!(c, '+' | '-' | ' '))
            .map_or(0, |(i, _)| i);
        let (sign, digits) = body.split_at(sign_len);
        format!("{}{}{}", sign, "0".repeat(fill), digits)
    } else {
        format!("{}{}", " ".repeat(fill), body)
    }
}

/// `%e`: mantissa plus a signed, at least two-digit exponent
fn exponent_form(x: f64, precision: usize, upper: bool) -> String {
    let rust = format!("{:.*e}", precision, x);
    let (mantissa, exponent) = rust.split_once('e').unwrap_or((&rust, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

/// `%g`: shortest of fixed and exponent form for `precision` significant digits
fn general_form(x: f64, precision: usize, alt: bool, upper: bool) -> String {
    let precision = precision.max(1);
    let exponent = if x == 0.0 {
        0
    } else {
        let rust = format!("{:.*e}", precision - 1, x);
        rust.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    if exponent < -4 || exponent >= precision as i32 {
        let body = exponent_form(x, precision - 1, upper);
        if alt {
            return body;
        }
        let marker = if upper { 'E' } else { 'e' };
        match body.split_once(marker) {
            Some((mantissa, exp)) => format!("{}{}{}", trim_fraction(mantissa), marker, exp),
            None => body,
        }
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        let body = format!("{:.*}", decimals, x);
        if alt {
            body
        } else {
            trim_fraction(&body).to_string()
        }
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Option<Value> {
        Some(Value::Int(n))
    }

    #[test]
    fn test_basic_conversions() {
        assert_eq!(format_printf(r"Age: %d\n", &[int(21)]), "Age: 21\n");
        assert_eq!(
            format_printf("%s is %c", &[Some(Value::Str("Ada".into())), Some(Value::Char('A'))]),
            "Ada is A"
        );
        assert_eq!(format_printf("%f", &[Some(Value::Float(2.5))]), "2.500000");
        assert_eq!(format_printf("%.2f", &[Some(Value::Float(3.14159))]), "3.14");
        assert_eq!(format_printf("%x %X", &[int(255), int(255)]), "ff FF");
        assert_eq!(format_printf("%u", &[int(-1)]), "4294967295");
        assert_eq!(format_printf("100%%", &[]), "100%");
    }

    #[test]
    fn test_promotions() {
        assert_eq!(format_printf("%d", &[Some(Value::Char('A'))]), "65");
        assert_eq!(format_printf("%c", &[int(66)]), "B");
        assert_eq!(format_printf("%f", &[int(3)]), "3.000000");
        assert_eq!(format_printf("%d", &[Some(Value::Float(9.7))]), "9");
        assert_eq!(format_printf("%d", &[Some(Value::Bool(true))]), "1");
    }

    #[test]
    fn test_width_and_flags() {
        assert_eq!(format_printf("[%5d]", &[int(42)]), "[   42]");
        assert_eq!(format_printf("[%-5d]", &[int(42)]), "[42   ]");
        assert_eq!(format_printf("[%05d]", &[int(-42)]), "[-0042]");
        assert_eq!(format_printf("[%+d]", &[int(7)]), "[+7]");
        assert_eq!(format_printf("[%8.3f]", &[Some(Value::Float(2.0))]), "[   2.000]");
    }

    #[test]
    fn test_exponent_and_general() {
        assert_eq!(format_printf("%e", &[Some(Value::Float(1234.5))]), "1.234500e+03");
        assert_eq!(format_printf("%.1E", &[Some(Value::Float(0.00012))]), "1.2E-04");
        assert_eq!(format_printf("%g", &[Some(Value::Float(0.5))]), "0.5");
        assert_eq!(format_printf("%g", &[Some(Value::Float(1e7))]), "1e+07");
        assert_eq!(format_printf("%g", &[Some(Value::Float(100.0))]), "100");
    }

    #[test]
    fn test_missing_and_unresolved_arguments() {
        assert_eq!(format_printf("%d and %d", &[int(1)]), "1 and %d");
        assert_eq!(format_printf("%d", &[None]), "NULL");
        assert_eq!(format_printf("only %d", &[int(1), int(2)]), "only 1");
        assert_eq!(format_printf("%q", &[int(1)]), "%q");
    }

    #[test]
    fn test_text_given_to_numeric_conversion() {
        assert_eq!(format_printf("%d", &[Some(Value::Str("Ada".into()))]), "Ada");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"a\tb\\c\"d\q"#), "a\tb\\c\"d\\q");
    }

    #[test]
    fn test_print_and_template() {
        assert_eq!(
            render_print(&[Some(Value::Str("n =".into())), int(3)], Dialect::Python),
            "n = 3"
        );
        assert_eq!(
            render_print(&[Some(Value::Float(2.0)), Some(Value::Bool(true))], Dialect::Python),
            "2.0 True"
        );
        assert_eq!(
            render_print(&[Some(Value::Float(2.0)), Some(Value::Bool(true))], Dialect::JavaScript),
            "2 true"
        );

        let parts = vec![
            TemplatePart::Text(r"Age:\t".to_string()),
            TemplatePart::Expr("age".to_string()),
            TemplatePart::Text("!".to_string()),
        ];
        assert_eq!(render_template(&parts, &[int(21)], Dialect::Python), "Age:\t21!");
        assert_eq!(render_template(&parts, &[None], Dialect::Python), "Age:\tNULL!");
    }
}
