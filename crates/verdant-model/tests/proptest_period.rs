// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use verdant_model::{quarter_bounds, IsoDate};

proptest! {
    #[test]
    fn quarter_bounds_are_ordered_and_year_stable(year in 1900u16..=9999, q in 1u8..=4) {
        let label = format!("Q{q} {year}");
        let (start, end) = quarter_bounds(&label).expect("quarter label must resolve");
        prop_assert!(start <= end);
        prop_assert_eq!(start.year(), i32::from(year));
        prop_assert_eq!(end.year(), i32::from(year));
    }

    #[test]
    fn parsed_dates_survive_reserialization(year in 1900u16..=9999, month in 1u8..=12, day in 1u8..=28) {
        let raw = format!("{year:04}-{month:02}-{day:02}");
        let date = IsoDate::parse(&raw).expect("well-formed date");
        prop_assert_eq!(date.as_str(), raw.as_str());
        prop_assert_eq!(date.year(), i32::from(year));
    }

    #[test]
    fn arbitrary_strings_never_panic_the_parsers(input in ".*") {
        let _ = IsoDate::parse(&input);
        let _ = quarter_bounds(&input);
    }
}
