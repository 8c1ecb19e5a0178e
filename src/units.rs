//! Amount and address helpers
//!
//! Token amounts travel to the engine backend as wei strings (10^18 base
//! units). Conversion is exact decimal string shifting, never floating
//! point, so `1.5` round-trips as `1500000000000000000` with no drift.

use thiserror::Error;

/// Number of decimal places in one token unit (ether-style).
pub const WEI_DECIMALS: usize = 18;

/// Errors from amount parsing and conversion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitsError {
    #[error("Invalid amount '{0}': expected a positive decimal number")]
    InvalidAmount(String),

    #[error("Invalid amount '{0}': more than {WEI_DECIMALS} decimal places")]
    TooManyDecimals(String),

    #[error("Invalid wei value '{0}': expected an unsigned integer string")]
    InvalidWei(String),
}

/// Convert a human decimal amount ("1.5") to a wei string
/// ("1500000000000000000").
///
/// Accepts an optional fractional part of up to 18 digits. Rejects empty,
/// negative, and non-numeric input.
pub fn to_wei(amount: &str) -> Result<String, UnitsError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    // "1." and ".5" are fine, "." alone is not.
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }
    if frac.len() > WEI_DECIMALS {
        return Err(UnitsError::TooManyDecimals(amount.to_string()));
    }

    let mut digits = String::with_capacity(whole.len() + WEI_DECIMALS);
    digits.push_str(whole);
    digits.push_str(frac);
    for _ in 0..(WEI_DECIMALS - frac.len()) {
        digits.push('0');
    }

    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(stripped.to_string())
    }
}

/// Convert a wei string back to a human decimal amount, trimming trailing
/// zeros ("1500000000000000000" -> "1.5", "0" -> "0").
pub fn from_wei(wei: &str) -> Result<String, UnitsError> {
    let trimmed = wei.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidWei(wei.to_string()));
    }

    let digits = trimmed.trim_start_matches('0');
    if digits.is_empty() {
        return Ok("0".to_string());
    }

    let (whole, frac) = if digits.len() > WEI_DECIMALS {
        let split = digits.len() - WEI_DECIMALS;
        (&digits[..split], &digits[split..])
    } else {
        ("", &digits[..])
    };

    let mut out = String::new();
    if whole.is_empty() {
        out.push('0');
    } else {
        out.push_str(whole);
    }

    let mut frac_padded = String::with_capacity(WEI_DECIMALS);
    for _ in 0..(WEI_DECIMALS - frac.len()) {
        frac_padded.push('0');
    }
    frac_padded.push_str(frac);

    let frac_trimmed = frac_padded.trim_end_matches('0');
    if !frac_trimmed.is_empty() {
        out.push('.');
        out.push_str(frac_trimmed);
    }
    Ok(out)
}

/// True if `s` is a 0x-prefixed 20-byte hex address.
pub fn is_address(s: &str) -> bool {
    regex::Regex::new(r"^0x[0-9a-fA-F]{40}$")
        .map(|re| re.is_match(s))
        .unwrap_or(false)
}

/// True if `s` is a 0x-prefixed 32-byte transaction hash.
pub fn is_tx_hash(s: &str) -> bool {
    regex::Regex::new(r"^0x[0-9a-fA-F]{64}$")
        .map(|re| re.is_match(s))
        .unwrap_or(false)
}

/// Elide an address for display: `0x1234...abcd`.
///
/// Strings too short to elide come back unchanged.
pub fn format_address(addr: &str) -> String {
    if addr.len() <= 10 {
        return addr.to_string();
    }
    format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
}

/// Block-explorer URL for a transaction hash.
pub fn explorer_tx_url(explorer_base: &str, tx_hash: &str) -> String {
    format!("{}/tx/{}", explorer_base.trim_end_matches('/'), tx_hash)
}
