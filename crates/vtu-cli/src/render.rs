//! Plain-text formatting helpers.

use chrono::Duration;
use rust_decimal::Decimal;

/// Format an amount as naira, e.g. `₦1,250.00`.
pub fn format_naira(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let fixed = format!("{:.2}", rounded.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    format!("{}₦{}.{}", sign, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact countdown such as `14m 05s`; zero or negative reads `expired`.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds();
    if secs <= 0 {
        return "expired".into();
    }
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// Render a list with a heading, or a fallback line when it is empty.
pub fn list<T>(title: &str, items: &[T], empty: &str, line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }

    let body = items.iter().map(line).collect::<Vec<_>>().join("\n");
    format!("{}\n{}", title, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_naira() {
        assert_eq!(format_naira(dec("0")), "₦0.00");
        assert_eq!(format_naira(dec("50")), "₦50.00");
        assert_eq!(format_naira(dec("1234.5")), "₦1,234.50");
        assert_eq!(format_naira(dec("1000000")), "₦1,000,000.00");
        assert_eq!(format_naira(dec("999.999")), "₦1,000.00");
        assert_eq!(format_naira(dec("-2500.25")), "-₦2,500.25");
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::seconds(0)), "expired");
        assert_eq!(format_remaining(Duration::seconds(-30)), "expired");
        assert_eq!(format_remaining(Duration::seconds(65)), "1m 05s");
        assert_eq!(format_remaining(Duration::seconds(20 * 60)), "20m 00s");
        assert_eq!(format_remaining(Duration::seconds(3 * 3600 + 90)), "3h 01m");
    }

    #[test]
    fn test_list_rendering() {
        let items = vec!["mtn", "glo"];
        assert_eq!(
            list("Networks:", &items, "None", |n| format!("- {}", n)),
            "Networks:\n- mtn\n- glo"
        );
        assert_eq!(list::<&str>("Networks:", &[], "None", |n| n.to_string()), "None");
    }
}
