use chrono::NaiveDate;

pub fn parse_date_safe(date_str: &str) -> Option<NaiveDate> {
    if date_str.trim().is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%Y%m%d"))
        .ok()
}

/// Formats an amount in centavos as "R$ 1.234,56".
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    let reais = (abs / 100).to_string();
    let centavos = abs % 100;

    let mut grouped = String::new();
    for (i, c) in reais.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    format!("{}R$ {},{:02}", sign, grouped, centavos)
}

/// Contract protocol numbers: YYYYMMDD-5XXXX, sequence resets daily.
pub fn next_protocol(date_str: &str, last_protocol: Option<&str>) -> String {
    let next_val = match last_protocol {
        Some(last) => {
            let parts: Vec<&str> = last.split('-').collect();
            if let Some(suffix) = parts.last() {
                suffix.parse::<i32>().unwrap_or(50000) + 1
            } else {
                50001
            }
        }
        None => 50001,
    };
    format!("{}-{}", date_str, next_val)
}

/// Receivable fold over (status, remaining_value) rows: open bookings only,
/// positive remainders only.
pub fn total_receivable(rows: &[(String, i64)]) -> i64 {
    rows.iter()
        .filter(|(status, _)| status != "cancelled" && status != "paid")
        .filter(|(_, remaining)| *remaining > 0)
        .map(|(_, remaining)| remaining)
        .sum()
}
