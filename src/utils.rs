// Raffle DApp - Utility Functions
use crate::error::DappError;
use arrayref::array_refs;
use solana_program::clock::UnixTimestamp;

/// Amounts in the chain's smallest unit
pub type Wei = u128;

/// Decimals of the native currency (1 ETH = 10^18 wei)
pub const ETHER_DECIMALS: u32 = 18;

/// Symbol shown next to native amounts
pub const NATIVE_SYMBOL: &str = "ETH";

/// Render a fixed-point integer as a decimal string.
///
/// Trailing zeros are trimmed but at least one fractional digit is kept, so
/// `0` renders as `0.0` and `1.5 * 10^18` (18 decimals) as `1.5`.
pub fn format_units(value: u128, decimals: u32) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return format!("{}.0", digits);
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// Convert wei to an ether decimal string
pub fn format_ether(wei: Wei) -> String {
    format_units(wei, ETHER_DECIMALS)
}

/// Parse a decimal string into a fixed-point integer with `decimals` places
pub fn parse_units(input: &str, decimals: u32) -> Result<u128, DappError> {
    let invalid = || DappError::InvalidAmount(input.to_string());
    let trimmed = input.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(invalid());
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(frac);
    digits.push_str(&"0".repeat(decimals as usize - frac.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<u128>().map_err(|_| invalid())
}

/// Convert an ether decimal string to wei
pub fn parse_ether(input: &str) -> Result<Wei, DappError> {
    parse_units(input, ETHER_DECIMALS)
}

/// Format a unix timestamp as `M/D/YYYY, h:mm:ss AM|PM` in UTC
pub fn format_timestamp(timestamp: UnixTimestamp) -> String {
    let days = timestamp.div_euclid(86_400);
    let seconds = timestamp.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);

    let hour = seconds / 3600;
    let minute = seconds % 3600 / 60;
    let second = seconds % 60;
    let (hour12, meridiem) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };

    format!(
        "{}/{}/{}, {}:{:02}:{:02} {}",
        month, day, year, hour12, minute, second, meridiem
    )
}

// Days since 1970-01-01 to (year, month, day) in the proleptic Gregorian calendar
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month as u32, day as u32)
}

/// Shorten an address for a status card: first 10 characters, `......`, last character
pub fn abbreviate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 11 {
        return address.to_string();
    }
    let head: String = chars[..10].iter().collect();
    format!("{}......{}", head, chars[chars.len() - 1])
}

/// Block explorer deep link for an address
pub fn explorer_url(base: &str, address: &str) -> String {
    format!("{}{}", base, address)
}

/// Pick an index below `len` by xor-folding the hash's four 8-byte lanes.
/// Returns `None` for an empty range.
pub fn pick_index(hash: &[u8; 32], len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let (a, b, c, d) = array_refs![hash, 8, 8, 8, 8];
    let folded = [a, b, c, d]
        .iter()
        .fold(0u64, |acc, lane| acc ^ u64::from_be_bytes(**lane));
    Some((folded % len as u64) as usize)
}
