use std::fmt;

/// Money is represented as integer paise (minor units) to avoid
/// floating-point precision issues. 1 rupee = 100 paise.
pub type Paise = i64;

/// Format paise as a rupee string with Indian digit grouping.
/// Example: 5000 -> "50.00", 10000000 -> "1,00,000.00"
pub fn format_paise(paise: Paise) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let abs = paise.unsigned_abs();
    format!("{}{}.{:02}", sign, group_rupees(abs / 100), abs % 100)
}

/// Indian grouping: the last three digits form one group, everything
/// before that is grouped in twos (12345678 -> "1,23,45,678").
fn group_rupees(rupees: u64) -> String {
    let digits = rupees.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);

    let mut idx = head.len() % 2;
    grouped.push_str(&head[..idx]);
    while idx < head.len() {
        if !grouped.is_empty() {
            grouped.push(',');
        }
        grouped.push_str(&head[idx..idx + 2]);
        idx += 2;
    }

    grouped.push(',');
    grouped.push_str(tail);
    grouped
}

/// Parse a rupee amount into paise. Accepts an optional leading rupee
/// sign and digit-group commas; extra decimal precision is truncated.
/// Example: "50.00" -> 5000, "₹1,00,000" -> 10000000, "12.5" -> 1250
pub fn parse_paise(input: &str) -> Result<Paise, ParsePaiseError> {
    let input = input.trim().trim_start_matches('₹');
    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let body: String = body.chars().filter(|c| *c != ',').collect();

    let (rupee_part, paise_part) = match body.split_once('.') {
        Some((rupees, paise)) => (rupees, paise),
        None => (body.as_str(), ""),
    };
    if rupee_part.is_empty() && paise_part.is_empty() {
        return Err(ParsePaiseError::InvalidFormat);
    }
    if !paise_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParsePaiseError::InvalidFormat);
    }

    let rupees: i64 = if rupee_part.is_empty() {
        0
    } else {
        rupee_part
            .parse()
            .map_err(|_| ParsePaiseError::InvalidFormat)?
    };
    let paise: i64 = match paise_part.len() {
        0 => 0,
        1 => {
            paise_part
                .parse::<i64>()
                .map_err(|_| ParsePaiseError::InvalidFormat)?
                * 10
        }
        _ => paise_part[..2]
            .parse()
            .map_err(|_| ParsePaiseError::InvalidFormat)?,
    };

    let total = rupees
        .checked_mul(100)
        .and_then(|r| r.checked_add(paise))
        .ok_or(ParsePaiseError::InvalidFormat)?;

    Ok(if negative { -total } else { total })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePaiseError {
    InvalidFormat,
}

impl fmt::Display for ParsePaiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePaiseError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParsePaiseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_paise() {
        assert_eq!(format_paise(5000), "50.00");
        assert_eq!(format_paise(1234), "12.34");
        assert_eq!(format_paise(1), "0.01");
        assert_eq!(format_paise(0), "0.00");
        assert_eq!(format_paise(-5000), "-50.00");
    }

    #[test]
    fn test_format_paise_indian_grouping() {
        assert_eq!(format_paise(100_000), "1,000.00");
        assert_eq!(format_paise(10_000_000), "1,00,000.00");
        assert_eq!(format_paise(1_234_567_800), "1,23,45,678.00");
        assert_eq!(format_paise(-10_000_000), "-1,00,000.00");
    }

    #[test]
    fn test_parse_paise() {
        assert_eq!(parse_paise("50.00"), Ok(5000));
        assert_eq!(parse_paise("50"), Ok(5000));
        assert_eq!(parse_paise("12.5"), Ok(1250));
        assert_eq!(parse_paise(".50"), Ok(50));
        assert_eq!(parse_paise("-30"), Ok(-3000));
        assert_eq!(parse_paise("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_paise_sign_and_grouping() {
        assert_eq!(parse_paise("₹20"), Ok(2000));
        assert_eq!(parse_paise("₹1,00,000"), Ok(10_000_000));
        assert_eq!(parse_paise("1,000.50"), Ok(100_050));
    }

    #[test]
    fn test_parse_then_format_round_trip() {
        assert_eq!(format_paise(parse_paise("₹1,00,000.50").unwrap()), "1,00,000.50");
    }

    #[test]
    fn test_parse_paise_invalid() {
        assert!(parse_paise("abc").is_err());
        assert!(parse_paise("12.34.56").is_err());
        assert!(parse_paise("").is_err());
        assert!(parse_paise("₹").is_err());
    }
}
