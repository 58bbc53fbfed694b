/// Format an amount as Indian rupees with two decimals and lakh/crore
/// digit grouping, e.g. `₹1,23,456.50`.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = group_indian(whole);
    // Rounding can turn a tiny negative into "0.00"; don't print "-₹0.00".
    let negative = amount < 0.0 && (whole != "0" || fraction != "00");
    format!("{}₹{}.{}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Group digits as 12,34,56,789: the last three together, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(999.5), "₹999.50");
        assert_eq!(format_currency(1000.0), "₹1,000.00");
        assert_eq!(format_currency(123456.5), "₹1,23,456.50");
        assert_eq!(format_currency(12345678.9), "₹1,23,45,678.90");
        assert_eq!(format_currency(-2500.0), "-₹2,500.00");
        assert_eq!(format_currency(-0.001), "₹0.00");
        assert_eq!(format_currency(f64::NAN), "₹0.00");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }
}
