//! Money rendering for the front end.

/// Separators and symbol used to render amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self::for_locale("pt-BR", "R$")
    }
}

impl MoneyFormat {
    /// Portuguese locales group with `.` and use `,` for decimals; everything
    /// else gets the English convention.
    pub fn for_locale(locale: &str, symbol: &str) -> Self {
        let lang = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let (decimal_separator, grouping_separator) = match lang.as_str() {
            "pt" | "es" | "de" | "it" => (',', '.'),
            _ => ('.', ','),
        };
        Self {
            symbol: symbol.to_string(),
            decimal_separator,
            grouping_separator,
        }
    }

    /// `R$ 1.234,50`, with a leading `-` for negatives.
    pub fn format(&self, amount: f64) -> String {
        let body = self.format_number(amount.abs(), 2);
        if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-{} {}", self.symbol, body)
        } else {
            format!("{} {}", self.symbol, body)
        }
    }

    /// Prefixes `+` or `-` the way transaction rows show direction.
    pub fn signed(&self, amount: f64, income: bool) -> String {
        let sign = if income { '+' } else { '-' };
        format!("{sign} {}", self.format(amount.abs()))
    }

    pub fn format_number(&self, value: f64, precision: usize) -> String {
        let raw = format!("{:.*}", precision, value);
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((int_part, frac)) => (int_part, Some(frac)),
            None => (raw.as_str(), None),
        };
        let (sign, digits) = match int_part.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", int_part),
        };
        let mut out = format!("{sign}{}", group_digits(digits, self.grouping_separator));
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }
}

/// Parses user-typed amounts, accepting either `,` or `.` as the decimal mark.
pub fn parse_amount(input: &str) -> Option<f64> {
    let normalized = input.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
