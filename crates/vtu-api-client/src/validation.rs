//! Client-side checks applied before a purchase leaves the machine.

use crate::types::NetworkCode;
use std::net::IpAddr;

/// Smallest airtime top-up accepted, in naira.
pub const MIN_AIRTIME_AMOUNT: u32 = 50;
/// Largest airtime top-up accepted, in naira.
pub const MAX_AIRTIME_AMOUNT: u32 = 50_000;

const MTN_PREFIXES: &[&str] = &[
    "0703", "0704", "0706", "0803", "0806", "0810", "0813", "0814", "0816", "0903", "0906",
    "0913", "0916",
];
const AIRTEL_PREFIXES: &[&str] = &[
    "0701", "0708", "0802", "0808", "0812", "0901", "0902", "0904", "0907", "0912",
];
const GLO_PREFIXES: &[&str] = &["0705", "0805", "0807", "0811", "0815", "0905", "0915"];
const NINE_MOBILE_PREFIXES: &[&str] = &["0809", "0817", "0818", "0908", "0909"];

/// Normalize a Nigerian mobile number to the local 11-digit form.
///
/// Accepts `+234…`, `234…` and `0…` inputs with arbitrary spacing,
/// dashes or parentheses, including the `+234 (0) 803…` form that keeps
/// the trunk zero after the country code.
pub fn normalize_phone_number(number: &str) -> Result<String, String> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err("Phone number must contain at least one digit".into());
    }

    let local = match digits.strip_prefix("234") {
        Some(rest) if rest.starts_with('0') => rest.to_string(),
        Some(rest) => format!("0{}", rest),
        None => digits,
    };

    if !local.starts_with('0') {
        return Err("Phone number must start with 0 or +234".into());
    }

    match local.len() {
        11 => Ok(local),
        n if n < 11 => Err("Phone number too short".into()),
        _ => Err("Phone number too long".into()),
    }
}

/// Guess the network from the number's prefix.
///
/// Ported numbers keep their original prefix, so this is only a default.
pub fn detect_network(number: &str) -> Option<NetworkCode> {
    let local = normalize_phone_number(number).ok()?;
    let prefix = &local[..4];

    if MTN_PREFIXES.contains(&prefix) {
        Some(NetworkCode::Mtn)
    } else if AIRTEL_PREFIXES.contains(&prefix) {
        Some(NetworkCode::Airtel)
    } else if GLO_PREFIXES.contains(&prefix) {
        Some(NetworkCode::Glo)
    } else if NINE_MOBILE_PREFIXES.contains(&prefix) {
        Some(NetworkCode::NineMobile)
    } else {
        None
    }
}

pub fn validate_airtime_amount(amount: u32) -> Result<(), String> {
    if amount < MIN_AIRTIME_AMOUNT {
        return Err(format!("Minimum airtime amount is ₦{}", MIN_AIRTIME_AMOUNT));
    }
    if amount > MAX_AIRTIME_AMOUNT {
        return Err(format!("Maximum airtime amount is ₦{}", MAX_AIRTIME_AMOUNT));
    }
    Ok(())
}

/// Parse and canonicalize an IPv4/IPv6 address for IP authorization.
pub fn validate_ip(ip: &str) -> Result<String, String> {
    ip.trim()
        .parse::<IpAddr>()
        .map(|addr| addr.to_string())
        .map_err(|_| format!("Invalid IP address: {}", ip))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(
            normalize_phone_number("+234 803 123 4567"),
            Ok("08031234567".into())
        );
        assert_eq!(
            normalize_phone_number("2348031234567"),
            Ok("08031234567".into())
        );
        assert_eq!(
            normalize_phone_number("0803-123-4567"),
            Ok("08031234567".into())
        );
        assert_eq!(
            normalize_phone_number("+234 (0) 803 123 4567"),
            Ok("08031234567".into())
        );
        assert!(normalize_phone_number("+234 (0) 0803 123 4567").is_err());
        assert!(normalize_phone_number("0803123").is_err());
        assert!(normalize_phone_number("080312345678").is_err());
        assert!(normalize_phone_number("18031234567").is_err());
        assert!(normalize_phone_number("").is_err());
    }

    #[test]
    fn test_detect_network() {
        assert_eq!(detect_network("08031234567"), Some(NetworkCode::Mtn));
        assert_eq!(detect_network("+2348021234567"), Some(NetworkCode::Airtel));
        assert_eq!(detect_network("08051234567"), Some(NetworkCode::Glo));
        assert_eq!(detect_network("09091234567"), Some(NetworkCode::NineMobile));
        assert_eq!(detect_network("07001234567"), None);
        assert_eq!(detect_network("123"), None);
    }

    #[test]
    fn test_validate_airtime_amount() {
        assert!(validate_airtime_amount(49).is_err());
        assert!(validate_airtime_amount(50).is_ok());
        assert!(validate_airtime_amount(50_000).is_ok());
        assert!(validate_airtime_amount(50_001).is_err());
    }

    #[test]
    fn test_validate_ip() {
        assert_eq!(validate_ip(" 102.89.3.14 "), Ok("102.89.3.14".into()));
        assert_eq!(validate_ip("2001:db8::1"), Ok("2001:db8::1".into()));
        assert!(validate_ip("102.89.3").is_err());
        assert!(validate_ip("localhost").is_err());
    }
}
