#[cfg(test)]
mod tests {
    use crate::commands::appointment::{is_valid_slot, TIME_SLOTS};
    use crate::commands::utils::{
        format_currency, next_protocol, parse_date_safe, total_receivable,
    };

    /// The remaining balance is always re-derived from total and deposit.
    #[test]
    fn test_remaining_value_derivation() {
        let cases: [(i64, i64); 4] = [(500, 150), (300, 0), (1000, 1000), (0, 0)];
        for (total, deposit) in cases {
            let remaining = total - deposit;
            assert!(remaining >= 0);
            assert_eq!(total, deposit + remaining);
        }
    }

    /// Receivables: open bookings only, positive remainders only.
    #[test]
    fn test_total_receivable_fold() {
        let rows = vec![
            ("pending".to_string(), 100),
            ("confirmed".to_string(), 250),
            ("cancelled".to_string(), 500),
        ];
        assert_eq!(total_receivable(&rows), 350);

        let rows = vec![
            ("paid".to_string(), 300),
            ("done".to_string(), 0),
            ("done".to_string(), -50),
        ];
        assert_eq!(total_receivable(&rows), 0);

        assert_eq!(total_receivable(&[]), 0);
    }

    #[test]
    fn test_time_slot_grid() {
        assert_eq!(TIME_SLOTS.len(), 30);
        assert_eq!(TIME_SLOTS[0], "08:00");
        assert_eq!(TIME_SLOTS[29], "22:30");

        assert!(is_valid_slot("14:30"));
        assert!(!is_valid_slot("14:15"));
        assert!(!is_valid_slot("23:00"));
        assert!(!is_valid_slot(""));
    }

    #[test]
    fn test_date_parsing() {
        use chrono::NaiveDate;

        assert_eq!(
            parse_date_safe("2023-10-27"),
            Some(NaiveDate::from_ymd_opt(2023, 10, 27).unwrap())
        );
        assert_eq!(
            parse_date_safe("20231027"),
            Some(NaiveDate::from_ymd_opt(2023, 10, 27).unwrap())
        );
        assert_eq!(parse_date_safe("invalid"), None);
        assert_eq!(parse_date_safe(""), None);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0), "R$ 0,00");
        assert_eq!(format_currency(150_00), "R$ 150,00");
        assert_eq!(format_currency(1_234_56), "R$ 1.234,56");
        assert_eq!(format_currency(1_000_000_00), "R$ 1.000.000,00");
        assert_eq!(format_currency(-9_90), "-R$ 9,90");
    }

    #[test]
    fn test_contract_protocol_sequence() {
        assert_eq!(next_protocol("20240520", None), "20240520-50001");
        assert_eq!(
            next_protocol("20240520", Some("20240520-50001")),
            "20240520-50002"
        );
        assert_eq!(
            next_protocol("20240521", Some("20240521-50099")),
            "20240521-50100"
        );
        // Malformed suffix falls back to the start of the range.
        assert_eq!(
            next_protocol("20240522", Some("20240522-abc")),
            "20240522-50001"
        );
    }
}
