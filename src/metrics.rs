//! Click-through rate arithmetic shared by the notification and analytics views.

/// Returns `clicks / impressions` as a percentage, or `0.0` when nothing was shown.
pub fn click_through_rate(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    (clicks as f64 / impressions as f64) * 100.0
}

/// Click-through rate rounded to `places` decimals.
pub fn rounded_ctr(clicks: u64, impressions: u64, places: u32) -> f64 {
    round_to(click_through_rate(clicks, impressions), places)
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn click_through_rate__should_be_zero_without_impressions() {
        // When
        let ctr = click_through_rate(12, 0);

        // Then
        assert_eq!(ctr, 0.0);
    }

    #[test]
    fn click_through_rate__should_return_percentage() {
        // When
        let ctr = click_through_rate(5, 100);

        // Then
        assert_eq!(ctr, 5.0);
    }

    #[test]
    fn rounded_ctr__should_round_to_requested_places() {
        // Then
        assert_eq!(rounded_ctr(234, 12345, 1), 1.9);
        assert_eq!(rounded_ctr(95, 4800, 2), 1.98);
        assert_eq!(rounded_ctr(0, 0, 2), 0.0);
    }
}
